//! Wraith automaton: the neglect companion.
//!
//! Idle days are recomputed from the last active date against "today",
//! never incremented in place, so a week offline catches up in a single
//! load. The wasted-days accumulator only ever grows, and only while an
//! exam date exists.

use serde::{Deserialize, Serialize};

use crate::calendar::{days_between, fully_missed_days, StudyDay};
use crate::config::WraithConfig;

/// Decay stages, in worsening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum WraithStage {
    #[default]
    Vigilant,
    Watchful,
    Fading,
    Shadow,
    Void,
}

impl WraithStage {
    pub const ALL: [WraithStage; 5] = [
        WraithStage::Vigilant,
        WraithStage::Watchful,
        WraithStage::Fading,
        WraithStage::Shadow,
        WraithStage::Void,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(WraithStage::Void)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WraithStage::Vigilant => "Vigilant",
            WraithStage::Watchful => "Watchful",
            WraithStage::Fading => "Fading",
            WraithStage::Shadow => "Shadow",
            WraithStage::Void => "Void",
        }
    }
}

/// Categorical exam proximity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExamUrgency {
    /// No exam date configured.
    #[default]
    None,
    Normal,
    /// Exam within 30 days.
    High,
    /// Exam within 7 days.
    Critical,
}

/// Urgency for an optional exam date as seen from `today`.
/// A date already behind us carries no urgency.
pub fn exam_urgency(exam_date: Option<StudyDay>, today: StudyDay) -> ExamUrgency {
    let Some(exam) = exam_date else {
        return ExamUrgency::None;
    };

    let days_left = days_between(today, exam);
    if days_left < 0 {
        ExamUrgency::None
    } else if days_left <= 7 {
        ExamUrgency::Critical
    } else if days_left <= 30 {
        ExamUrgency::High
    } else {
        ExamUrgency::Normal
    }
}

/// Fully missed calendar days since the last qualifying event.
/// Never active means nothing to miss yet.
pub fn idle_days_since(last_active: Option<StudyDay>, today: StudyDay) -> u32 {
    match last_active {
        Some(last) => fully_missed_days(last, today),
        None => 0,
    }
}

/// Stage for an idle-day count under the given urgency.
///
/// Base stage comes from the fixed breakpoints; critical exam proximity
/// pushes one stage further (capped at Void).
pub fn stage_for(days_idle: u32, urgency: ExamUrgency, cfg: &WraithConfig) -> WraithStage {
    let mut index = 0;
    for (i, breakpoint) in cfg.stage_days.iter().enumerate() {
        if days_idle >= *breakpoint {
            index = i;
        }
    }

    if urgency == ExamUrgency::Critical && days_idle > 0 {
        index = (index + 1).min(WraithStage::ALL.len() - 1);
    }

    WraithStage::from_index(index)
}

/// Wasted-day weight for one idle day. Zero without an exam date: regret
/// only accumulates against a configured goal.
pub fn wasted_increment(urgency: ExamUrgency, cfg: &WraithConfig) -> f64 {
    match urgency {
        ExamUrgency::None => 0.0,
        ExamUrgency::Normal => cfg.waste_weight_normal,
        ExamUrgency::High => cfg.waste_weight_high,
        ExamUrgency::Critical => cfg.waste_weight_critical,
    }
}
