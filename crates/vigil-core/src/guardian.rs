//! Guardian automaton: the growth companion.
//!
//! The stage is a pure projection of cumulative study hours. It is stored
//! as `max(current, projection)` so it can never regress, no matter how
//! stale or out-of-order an update is. Health is a separate vital sign
//! that rises with study and decays with neglect; it never affects stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GuardianConfig;

/// Growth stages, in feeding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum GuardianStage {
    #[default]
    DormantSeed,
    Sprout,
    Sapling,
    YoungTree,
    AncientGuardian,
}

impl GuardianStage {
    pub const ALL: [GuardianStage; 5] = [
        GuardianStage::DormantSeed,
        GuardianStage::Sprout,
        GuardianStage::Sapling,
        GuardianStage::YoungTree,
        GuardianStage::AncientGuardian,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(GuardianStage::AncientGuardian)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GuardianStage::DormantSeed => "Dormant Seed",
            GuardianStage::Sprout => "Sprout",
            GuardianStage::Sapling => "Sapling",
            GuardianStage::YoungTree => "Young Tree",
            GuardianStage::AncientGuardian => "Ancient Guardian",
        }
    }
}

/// Highest stage whose hour threshold is at or below `total_hours`.
pub fn stage_for_hours(total_hours: f64, cfg: &GuardianConfig) -> GuardianStage {
    let mut stage = GuardianStage::DormantSeed;
    for (i, threshold) in cfg.stage_hours.iter().enumerate() {
        if total_hours >= *threshold {
            stage = GuardianStage::from_index(i);
        }
    }
    stage
}

/// Non-regressing stage update: the projection from cumulative hours,
/// floored at whatever stage was already reached.
pub fn project_stage(current: GuardianStage, total_hours: f64, cfg: &GuardianConfig) -> GuardianStage {
    current.max(stage_for_hours(total_hours, cfg))
}

/// Progress toward the next stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardianProgress {
    /// Hours still missing to the next stage; 0 at the top.
    pub needed_hours: f64,
    /// Progress through the current band, 0-100.
    pub percentage: f64,
}

/// Progress of `total_hours` through the band that `stage` occupies.
pub fn progress(total_hours: f64, stage: GuardianStage, cfg: &GuardianConfig) -> GuardianProgress {
    let idx = stage.index();
    if idx + 1 >= cfg.stage_hours.len() {
        return GuardianProgress { needed_hours: 0.0, percentage: 100.0 };
    }

    let floor = cfg.stage_hours[idx];
    let ceiling = cfg.stage_hours[idx + 1];
    let band = (ceiling - floor).max(f64::EPSILON);
    let pct = (100.0 * (total_hours - floor) / band).clamp(0.0, 100.0);

    GuardianProgress {
        needed_hours: (ceiling - total_hours).max(0.0),
        percentage: pct,
    }
}

/// Health restored by one study session, proportional to length and capped.
pub fn restore_for(minutes: u32, cfg: &GuardianConfig) -> f64 {
    (cfg.health_restore_base + cfg.health_restore_per_minute * minutes as f64)
        .min(cfg.health_restore_cap)
}

/// Health after decay, recomputed from the last feeding time against `now`.
///
/// Full health survives the grace period untouched, then drops linearly.
/// Never negative, and a missing `last_fed` (never fed) decays nothing.
pub fn decayed_health(
    health: f64,
    last_fed: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cfg: &GuardianConfig,
) -> f64 {
    let Some(fed) = last_fed else {
        return health.clamp(0.0, 100.0);
    };

    let elapsed_hours = (now - fed).num_seconds().max(0) as f64 / 3600.0;
    let decaying_hours = (elapsed_hours - cfg.health_grace_hours).max(0.0);
    let lost = cfg.health_decay_per_day * decaying_hours / 24.0;

    (health - lost).clamp(0.0, 100.0)
}
