//! XP ledger: turns study events into progression-record mutations.
//!
//! Every entry point mutates the record in place and reports what the UI
//! should show: the XP delta with its reason, the streak transition if one
//! ran, and at most one newly unlocked achievement to surface (all of them
//! are recorded). Level and title are recomputed from XP after every
//! mutation, never advanced on their own.

use chrono::{DateTime, Utc};

use vigil_core::achievements::{check_new_achievements, Achievement};
use vigil_core::calendar::StudyDay;
use vigil_core::config::EngineConfig;
use vigil_core::records::ProgressionRecord;
use vigil_core::streaks::{compute_streak, StreakOutcome};

/// XP awarded by one call, for immediate UI feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpGain {
    pub delta: u64,
    pub reason: String,
}

impl XpGain {
    /// Zero gain, used by no-op paths.
    pub fn none() -> Self {
        Self { delta: 0, reason: String::new() }
    }
}

/// Everything one mutation produced.
#[derive(Debug, Clone)]
pub struct LedgerOutcome {
    pub gain: XpGain,
    /// Present only for events that touch the streak.
    pub streak: Option<StreakOutcome>,
    /// All achievements newly recorded by this mutation.
    pub unlocked: Vec<Achievement>,
    /// The single unlock surfaced for notification.
    pub notify: Option<Achievement>,
}

/// Recompute level/title and record any newly satisfied achievements.
/// Runs after every mutation.
fn finalize(rec: &mut ProgressionRecord) -> (Vec<Achievement>, Option<Achievement>) {
    rec.refresh_level();
    let unlocked = check_new_achievements(rec);
    for ach in &unlocked {
        rec.achievements.push(ach.id.to_string());
    }
    let notify = unlocked.first().cloned();
    (unlocked, notify)
}

/// A focus session: the only event that drives streaks and companions.
pub fn record_focus_session(
    rec: &mut ProgressionRecord,
    minutes: u32,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> LedgerOutcome {
    let today = StudyDay::from_utc(now);
    let streak = compute_streak(
        rec.last_active_date,
        rec.current_streak,
        rec.streak_freezes_remaining,
        today,
    );

    let mut delta = (minutes as f64 * cfg.xp.per_minute * cfg.xp.global_multiplier).round() as u64;

    if rec.total_focus_minutes == 0 {
        delta += cfg.xp.first_session_bonus;
    }

    if streak.is_new_day {
        delta += cfg.xp.daily_login_bonus;
        // Milestone bonus fires exactly on the crossing, not on every day
        // above the threshold.
        if streak.new_streak == 7 {
            delta += cfg.xp.streak_week_bonus;
        }
        if streak.new_streak == 30 {
            delta += cfg.xp.streak_month_bonus;
        }

        if streak.freeze_used {
            rec.streak_freezes_remaining = rec.streak_freezes_remaining.saturating_sub(1);
            rec.streak_freeze_used_at = Some(now);
        }

        rec.current_streak = streak.new_streak;
        rec.longest_streak = rec.longest_streak.max(streak.new_streak);
        rec.last_active_date = Some(today);
    }

    rec.total_focus_minutes += minutes as u64;
    rec.xp += delta;

    let (unlocked, notify) = finalize(rec);
    LedgerOutcome {
        gain: XpGain { delta, reason: format!("Focused for {} minutes", minutes) },
        streak: Some(streak),
        unlocked,
        notify,
    }
}

/// A spaced-repetition review. Deliberately does not touch the streak or
/// the companions: reviews are not "study time" under current policy.
pub fn record_review(rec: &mut ProgressionRecord, cfg: &EngineConfig) -> LedgerOutcome {
    let delta = cfg.xp.review_reward;
    rec.total_reviews += 1;
    rec.xp += delta;

    let (unlocked, notify) = finalize(rec);
    LedgerOutcome {
        gain: XpGain { delta, reason: "Review completed".to_string() },
        streak: None,
        unlocked,
        notify,
    }
}

/// A logged mock exam, with a one-time bonus for the first.
pub fn record_mock(rec: &mut ProgressionRecord, cfg: &EngineConfig) -> LedgerOutcome {
    let mut delta = cfg.xp.mock_reward;
    if rec.total_mocks == 0 {
        delta += cfg.xp.first_mock_bonus;
    }
    rec.total_mocks += 1;
    rec.xp += delta;

    let (unlocked, notify) = finalize(rec);
    LedgerOutcome {
        gain: XpGain { delta, reason: "Mock exam logged".to_string() },
        streak: None,
        unlocked,
        notify,
    }
}

/// A syllabus topic checked off.
pub fn record_syllabus_topic(rec: &mut ProgressionRecord, cfg: &EngineConfig) -> LedgerOutcome {
    let delta = cfg.xp.syllabus_reward;
    rec.xp += delta;

    let (unlocked, notify) = finalize(rec);
    LedgerOutcome {
        gain: XpGain { delta, reason: "Syllabus topic completed".to_string() },
        streak: None,
        unlocked,
        notify,
    }
}

/// Raw entry point for ad-hoc bonuses (quests, promos).
pub fn add_xp(rec: &mut ProgressionRecord, amount: u64, reason: &str) -> LedgerOutcome {
    rec.xp += amount;

    let (unlocked, notify) = finalize(rec);
    LedgerOutcome {
        gain: XpGain { delta: amount, reason: reason.to_string() },
        streak: None,
        unlocked,
        notify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_first_session_bootstraps_everything() {
        let c = cfg();
        let mut rec = ProgressionRecord::default();
        let out = record_focus_session(&mut rec, 30, at(1), &c);

        // 30 min * 2 XP + first session 50 + daily login 10
        assert_eq!(out.gain.delta, 120);
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 1);
        assert_eq!(rec.total_focus_minutes, 30);
        assert_eq!(rec.level, 2);
        assert!(rec.has_achievement("first_session"));
        assert!(out.notify.is_some());
    }

    #[test]
    fn test_same_day_sessions_do_not_restack_daily_bonus() {
        let c = cfg();
        let mut rec = ProgressionRecord::default();
        record_focus_session(&mut rec, 30, at(1), &c);
        let out = record_focus_session(&mut rec, 30, at(1), &c);

        assert_eq!(out.gain.delta, 60); // raw minutes only
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.total_focus_minutes, 60);
    }

    #[test]
    fn test_week_milestone_fires_exactly_on_crossing() {
        let c = cfg();
        let mut rec = ProgressionRecord::default();
        let mut deltas = Vec::new();
        for day in 1..=9 {
            let out = record_focus_session(&mut rec, 10, at(day), &c);
            deltas.push(out.gain.delta);
        }
        // Day 7 carries the week bonus; days 8 and 9 do not.
        assert_eq!(deltas[6], 20 + 10 + 70);
        assert_eq!(deltas[7], 20 + 10);
        assert_eq!(deltas[8], 20 + 10);
        assert_eq!(rec.current_streak, 9);
    }

    #[test]
    fn test_freeze_consumed_on_gap() {
        let c = cfg();
        let mut rec = ProgressionRecord {
            current_streak: 5,
            longest_streak: 5,
            last_active_date: Some(StudyDay::from_ymd(2026, 5, 1).unwrap()),
            streak_freezes_remaining: 1,
            total_focus_minutes: 100,
            ..Default::default()
        };
        let now = at(4); // last active 3 days ago
        let out = record_focus_session(&mut rec, 20, now, &c);

        assert_eq!(rec.current_streak, 6);
        assert_eq!(rec.streak_freezes_remaining, 0);
        assert_eq!(rec.streak_freeze_used_at, Some(now));
        assert!(out.streak.unwrap().freeze_used);
    }

    #[test]
    fn test_gap_without_freeze_resets_but_keeps_longest() {
        let c = cfg();
        let mut rec = ProgressionRecord {
            current_streak: 5,
            longest_streak: 5,
            last_active_date: Some(StudyDay::from_ymd(2026, 5, 1).unwrap()),
            streak_freezes_remaining: 0,
            total_focus_minutes: 100,
            ..Default::default()
        };
        record_focus_session(&mut rec, 20, at(4), &c);

        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 5);
    }

    #[test]
    fn test_review_does_not_touch_streak() {
        let c = cfg();
        let mut rec = ProgressionRecord::default();
        let out = record_review(&mut rec, &c);

        assert_eq!(out.gain.delta, 5);
        assert_eq!(rec.total_reviews, 1);
        assert_eq!(rec.current_streak, 0);
        assert!(rec.last_active_date.is_none());
        assert!(out.streak.is_none());
    }

    #[test]
    fn test_first_mock_bonus_once() {
        let c = cfg();
        let mut rec = ProgressionRecord::default();
        let first = record_mock(&mut rec, &c);
        let second = record_mock(&mut rec, &c);

        assert_eq!(first.gain.delta, 75);
        assert_eq!(second.gain.delta, 25);
        assert_eq!(rec.total_mocks, 2);
        assert!(rec.has_achievement("first_mock"));
    }

    #[test]
    fn test_level_recomputed_from_xp_after_adhoc_grant() {
        let mut rec = ProgressionRecord::default();
        let out = add_xp(&mut rec, 2_500, "weekly quest");

        assert_eq!(out.gain.reason, "weekly quest");
        assert_eq!(rec.xp, 2_500);
        assert_eq!(rec.level, 6); // looked up, not incremented
        assert_eq!(rec.title, "Mock Slayer");
    }

    #[test]
    fn test_single_notification_even_with_multiple_unlocks() {
        let c = cfg();
        let mut rec = ProgressionRecord {
            total_focus_minutes: 599, // one minute short of 10h
            longest_streak: 6,
            current_streak: 6,
            last_active_date: Some(StudyDay::from_ymd(2026, 5, 1).unwrap()),
            ..Default::default()
        };
        // Crossing to day 7 unlocks streak_7; the minutes unlock focus_10h
        // and first_session-style milestones in the same call.
        let out = record_focus_session(&mut rec, 1, at(2), &c);

        assert!(out.unlocked.len() >= 2);
        assert!(out.notify.is_some());
        // Every unlock is recorded even though only one is surfaced.
        for ach in &out.unlocked {
            assert!(rec.has_achievement(ach.id));
        }
    }
}
