//! Calendar-day arithmetic shared by streaks and the wraith automaton.
//!
//! Every "today"/"yesterday"/"missed day" decision in the engine goes
//! through this module so the two consumers can never disagree about
//! where a day boundary falls.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day, the unit streaks and idle counts are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudyDay(NaiveDate);

impl StudyDay {
    /// Current calendar day for a wall-clock instant.
    pub fn from_utc(now: DateTime<Utc>) -> Self {
        Self(now.date_naive())
    }

    /// Build a day from year/month/day. Returns `None` for invalid dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Signed whole days from `self` to `other` (positive when `other` is later).
    pub fn days_until(&self, other: StudyDay) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl std::fmt::Display for StudyDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whole days from `earlier` to `later`. Negative if `later` precedes `earlier`.
pub fn days_between(earlier: StudyDay, later: StudyDay) -> i64 {
    earlier.days_until(later)
}

/// True when `last` is exactly the day before `today`.
pub fn is_yesterday(last: StudyDay, today: StudyDay) -> bool {
    days_between(last, today) == 1
}

/// Calendar days that passed with no chance of activity: the days strictly
/// between `last_active` and `today`. Active yesterday means zero missed days;
/// active three days ago means two.
pub fn fully_missed_days(last_active: StudyDay, today: StudyDay) -> u32 {
    let gap = days_between(last_active, today);
    if gap <= 1 {
        0
    } else {
        (gap - 1) as u32
    }
}
