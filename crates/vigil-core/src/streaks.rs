//! Streak transition for the progression system.
//!
//! A streak counts consecutive calendar days with at least one qualifying
//! study event. The transition is a pure function of the stored state and
//! "today" so repeated same-day events can never double-increment and
//! arbitrary offline gaps are handled in one step.

use crate::calendar::{days_between, StudyDay};

/// Result of applying one qualifying event to the streak state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub new_streak: u32,
    /// True when this is the first qualifying event of the calendar day.
    pub is_new_day: bool,
    /// True when a freeze was consumed to bridge the gap.
    pub freeze_used: bool,
}

/// Apply one qualifying study event dated `today`.
///
/// - Never active before: streak starts at 1.
/// - Already active today: nothing changes.
/// - Active yesterday: streak extends by 1.
/// - Missed one or more days: a freeze (if held) forgives the gap and the
///   streak still extends by 1; otherwise the streak restarts at 1.
pub fn compute_streak(
    last_active: Option<StudyDay>,
    current_streak: u32,
    freezes_remaining: u8,
    today: StudyDay,
) -> StreakOutcome {
    let Some(last) = last_active else {
        return StreakOutcome { new_streak: 1, is_new_day: true, freeze_used: false };
    };

    let gap = days_between(last, today);

    // gap < 0 means the stored date is ahead of the caller's clock; treat it
    // as a same-day repeat rather than corrupting the streak.
    if gap <= 0 {
        return StreakOutcome {
            new_streak: current_streak,
            is_new_day: false,
            freeze_used: false,
        };
    }

    if gap == 1 {
        return StreakOutcome {
            new_streak: current_streak + 1,
            is_new_day: true,
            freeze_used: false,
        };
    }

    // Missed at least one full day.
    if freezes_remaining >= 1 {
        StreakOutcome {
            new_streak: current_streak + 1,
            is_new_day: true,
            freeze_used: true,
        }
    } else {
        StreakOutcome { new_streak: 1, is_new_day: true, freeze_used: false }
    }
}
