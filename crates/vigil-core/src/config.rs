//! Engine tunables.
//!
//! Everything the product team may want to retune without a schema change
//! lives here: XP rates, companion stage thresholds, the health decay
//! curve, wraith breakpoints and urgency weights. Defaults are the shipped
//! values; none of them is a stored contract.

use serde::{Deserialize, Serialize};

/// XP rewards per event kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpRates {
    /// XP per focused minute before the global multiplier.
    pub per_minute: f64,
    /// Global multiplier applied to focus XP (events/promos).
    pub global_multiplier: f64,
    /// One-time bonus on the very first focus session.
    pub first_session_bonus: u64,
    /// Bonus on the first qualifying event of each calendar day.
    pub daily_login_bonus: u64,
    /// One-time bonus when the streak reaches 7.
    pub streak_week_bonus: u64,
    /// One-time bonus when the streak reaches 30.
    pub streak_month_bonus: u64,
    /// Flat reward for a completed review.
    pub review_reward: u64,
    /// Flat reward for a logged mock exam.
    pub mock_reward: u64,
    /// One-time bonus on the first mock.
    pub first_mock_bonus: u64,
    /// Flat reward for checking off a syllabus topic.
    pub syllabus_reward: u64,
}

impl Default for XpRates {
    fn default() -> Self {
        Self {
            per_minute: 2.0,
            global_multiplier: 1.0,
            first_session_bonus: 50,
            daily_login_bonus: 10,
            streak_week_bonus: 70,
            streak_month_bonus: 300,
            review_reward: 5,
            mock_reward: 25,
            first_mock_bonus: 50,
            syllabus_reward: 3,
        }
    }
}

/// Guardian growth and health tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// Cumulative study hours required to enter each stage, index 0..=4.
    /// Must be non-decreasing with stage_hours[0] == 0.
    pub stage_hours: [f64; 5],
    /// Hours after the last feeding before health starts to drop.
    pub health_grace_hours: f64,
    /// Health points lost per day once the grace period is over.
    pub health_decay_per_day: f64,
    /// Flat health restored by any study session.
    pub health_restore_base: f64,
    /// Extra health per focused minute.
    pub health_restore_per_minute: f64,
    /// Cap on health restored by a single session.
    pub health_restore_cap: f64,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            stage_hours: [0.0, 5.0, 20.0, 50.0, 120.0],
            health_grace_hours: 24.0,
            health_decay_per_day: 15.0,
            health_restore_base: 10.0,
            health_restore_per_minute: 0.25,
            health_restore_cap: 30.0,
        }
    }
}

/// Wraith idle breakpoints and urgency weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WraithConfig {
    /// Idle days at which each stage begins, index 0..=4.
    /// Must be non-decreasing with stage_days[0] == 0.
    pub stage_days: [u32; 5],
    /// Wasted-day weight while exam urgency is critical.
    pub waste_weight_critical: f64,
    /// Wasted-day weight while exam urgency is high.
    pub waste_weight_high: f64,
    /// Wasted-day weight otherwise (exam date set but not close).
    pub waste_weight_normal: f64,
}

impl Default for WraithConfig {
    fn default() -> Self {
        Self {
            stage_days: [0, 1, 3, 6, 14],
            waste_weight_critical: 3.0,
            waste_weight_high: 2.0,
            waste_weight_normal: 1.0,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub xp: XpRates,
    #[serde(default)]
    pub guardian: GuardianConfig,
    #[serde(default)]
    pub wraith: WraithConfig,
    /// Companion message history kept per user (oldest dropped first).
    #[serde(default = "default_max_message_history")]
    pub max_message_history: usize,
    /// Days a freeze must sit unused before a spent one is replenished.
    #[serde(default = "default_freeze_replenish_days")]
    pub freeze_replenish_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xp: XpRates::default(),
            guardian: GuardianConfig::default(),
            wraith: WraithConfig::default(),
            max_message_history: default_max_message_history(),
            freeze_replenish_days: default_freeze_replenish_days(),
        }
    }
}

fn default_max_message_history() -> usize {
    20
}

fn default_freeze_replenish_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.guardian.stage_hours[0], 0.0);
        assert!(cfg.guardian.stage_hours.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(cfg.wraith.stage_days[0], 0);
        assert!(cfg.wraith.stage_days.windows(2).all(|w| w[0] <= w[1]));
        assert!(cfg.max_message_history > 0);
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.xp.per_minute, cfg.xp.per_minute);
        assert_eq!(back.wraith.stage_days, cfg.wraith.stage_days);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"xp":{"per_minute":3.0,"global_multiplier":1.0,"first_session_bonus":50,"daily_login_bonus":10,"streak_week_bonus":70,"streak_month_bonus":300,"review_reward":5,"mock_reward":25,"first_mock_bonus":50,"syllabus_reward":3}}"#).unwrap();
        assert_eq!(cfg.xp.per_minute, 3.0);
        assert_eq!(cfg.max_message_history, 20);
    }
}
