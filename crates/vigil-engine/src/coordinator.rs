//! Companion coordinator: feeds both automata from one event.
//!
//! A study event updates guardian and wraith in the same in-memory record
//! so the caller can upsert it as one unit; there is no window where one
//! automaton's half is written without the other. An app-open with no
//! event only recomputes time-derived values and reports whether anything
//! actually changed, so idle loads stay write-free.

use chrono::{DateTime, Utc};

use vigil_core::calendar::StudyDay;
use vigil_core::config::EngineConfig;
use vigil_core::guardian::{decayed_health, project_stage, restore_for};
use vigil_core::messages::{guardian_message, wraith_message, MessageContext};
use vigil_core::records::{CompanionKind, CompanionMessage, CompanionRecord, ProgressionRecord};
use vigil_core::wraith::{exam_urgency, idle_days_since, stage_for, wasted_increment};

/// What a study event did to the companions.
#[derive(Debug, Clone, Copy)]
pub struct StudyEventEffect {
    pub guardian_staged_up: bool,
}

/// Apply a reported study event to both automata.
pub fn apply_study_event(
    comp: &mut CompanionRecord,
    prog: &ProgressionRecord,
    minutes: u32,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> StudyEventEffect {
    let today = StudyDay::from_utc(now);

    // Guardian: decay what time took, then feed.
    let current = decayed_health(comp.guardian_health, comp.guardian_last_fed, now, &cfg.guardian);
    comp.guardian_health = (current + restore_for(minutes, &cfg.guardian)).min(100.0);
    comp.guardian_total_hours += minutes as f64 / 60.0;

    let before = comp.guardian_stage;
    comp.guardian_stage = project_stage(before, comp.guardian_total_hours, &cfg.guardian);
    let guardian_staged_up = comp.guardian_stage > before;

    comp.guardian_last_fed = Some(now);

    // Wraith: any event clears the idle count and floors the stage.
    // The wasted-days total stays; regret is not refundable.
    comp.wraith_days_idle = 0;
    comp.wraith_stage = stage_for(0, exam_urgency(comp.exam_date, today), &cfg.wraith);

    let ctx = MessageContext { today, guardian_staged_up };
    let g = guardian_message(prog, comp, &ctx);
    let w = wraith_message(prog, comp, &ctx);
    comp.push_message(
        CompanionMessage::new(CompanionKind::Guardian, g, now),
        cfg.max_message_history,
    );
    comp.push_message(
        CompanionMessage::new(CompanionKind::Wraith, w, now),
        cfg.max_message_history,
    );

    StudyEventEffect { guardian_staged_up }
}

/// Recompute time-derived companion state on an app open with no event.
/// Returns true when a value changed and the record is worth writing back.
///
/// Guardian health is not touched here: the stored value anchors at the
/// last feeding and the decayed view is computed on read, so repeated
/// ticks can never compound the decay.
pub fn apply_idle_tick(
    comp: &mut CompanionRecord,
    prog: &ProgressionRecord,
    last_active: Option<StudyDay>,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> bool {
    let today = StudyDay::from_utc(now);
    let mut changed = false;

    let idle_now = idle_days_since(last_active, today);
    if idle_now != comp.wraith_days_idle {
        let urgency = exam_urgency(comp.exam_date, today);

        // Wasted days accrue only for newly missed days, and only while an
        // exam date exists.
        if idle_now > comp.wraith_days_idle {
            let missed = (idle_now - comp.wraith_days_idle) as f64;
            comp.wraith_wasted_days += missed * wasted_increment(urgency, &cfg.wraith);
        }

        comp.wraith_days_idle = idle_now;
        comp.wraith_stage = stage_for(idle_now, urgency, &cfg.wraith);
        changed = true;

        let ctx = MessageContext { today, guardian_staged_up: false };
        let w = wraith_message(prog, comp, &ctx);
        comp.push_message(
            CompanionMessage::new(CompanionKind::Wraith, w, now),
            cfg.max_message_history,
        );
    }

    changed
}
