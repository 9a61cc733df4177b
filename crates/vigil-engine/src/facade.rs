//! Progression facade: the single entry point callers see.
//!
//! One facade per signed-in session. Mutations are optimistic: in-memory
//! state changes synchronously and the XP gain returns immediately, while
//! the store write happens on a spawned task nobody awaits. A failed write
//! is logged and flagged; the next `refresh_stats` reloads the
//! authoritative rows instead of attempting a rollback. Acceptable for
//! gamification; never copy this pattern for anything monetary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use vigil_core::achievements::Achievement;
use vigil_core::calendar::{days_between, StudyDay};
use vigil_core::config::EngineConfig;
use vigil_core::guardian::{decayed_health, progress, GuardianProgress};
use vigil_core::levels::{level_for_xp, next_level, NextLevel};
use vigil_core::records::{CompanionRecord, ProgressionRecord};
use vigil_core::VigilError;

use crate::coordinator::{apply_idle_tick, apply_study_event};
use crate::ledger::{self, XpGain};
use crate::store::RecordStore;

/// Level and progress summary for display.
#[derive(Debug, Clone)]
pub struct LevelInfo {
    pub level: u32,
    pub title: &'static str,
    /// `None` at the top of the table.
    pub next: Option<NextLevel>,
}

/// Per-session progression engine.
pub struct ProgressionFacade {
    store: Arc<dyn RecordStore>,
    user_id: Option<String>,
    config: EngineConfig,
    progression: ProgressionRecord,
    companion: CompanionRecord,
    loaded: bool,
    /// A row load failed; run on defaults and skip writes until a clean load.
    degraded: bool,
    needs_reconcile: Arc<AtomicBool>,
    recent_xp_gain: Option<XpGain>,
    new_achievement: Option<Achievement>,
}

impl ProgressionFacade {
    /// `user_id` is `None` when nobody is signed in; every operation then
    /// degrades to a cheap no-op instead of an error.
    pub fn new(store: Arc<dyn RecordStore>, user_id: Option<String>, config: EngineConfig) -> Self {
        Self {
            store,
            user_id,
            config,
            progression: ProgressionRecord::default(),
            companion: CompanionRecord::default(),
            loaded: false,
            degraded: false,
            needs_reconcile: Arc::new(AtomicBool::new(false)),
            recent_xp_gain: None,
            new_achievement: None,
        }
    }

    fn user(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Load both rows once per session, or again after a flagged write
    /// failure. Missing rows become zeroed defaults. A load *error* is not
    /// the same as a missing row: the session runs on defaults for display
    /// but stays degraded, skipping every write until a later load succeeds,
    /// so a transient read failure can never overwrite the stored rows.
    async fn ensure_loaded(&mut self) {
        let Some(user) = self.user_id.clone() else { return };
        if self.loaded && !self.needs_reconcile.load(Ordering::SeqCst) {
            return;
        }

        let mut failed = false;
        match self.store.load_progression(&user).await {
            Ok(Some(rec)) => self.progression = rec,
            Ok(None) => self.progression = ProgressionRecord::default(),
            Err(e) => {
                warn!(user = %user, error = %e, "progression load failed, session degraded until it succeeds");
                self.progression = ProgressionRecord::default();
                failed = true;
            }
        }
        match self.store.load_companion(&user).await {
            Ok(Some(rec)) => self.companion = rec,
            Ok(None) => self.companion = CompanionRecord::default(),
            Err(e) => {
                warn!(user = %user, error = %e, "companion load failed, session degraded until it succeeds");
                self.companion = CompanionRecord::default();
                failed = true;
            }
        }

        self.loaded = true;
        self.degraded = failed;
        self.needs_reconcile.store(failed, Ordering::SeqCst);
    }

    fn spawn_save_progression(&self) {
        if self.degraded {
            debug!("progression write skipped while loads are failing");
            return;
        }
        let Some(user) = self.user_id.clone() else { return };
        let store = Arc::clone(&self.store);
        let record = self.progression.clone();
        let flag = Arc::clone(&self.needs_reconcile);
        tokio::spawn(async move {
            if let Err(e) = store.save_progression(&user, &record).await {
                warn!(user = %user, error = %e, "progression write failed, will reconcile on next refresh");
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    fn spawn_save_companion(&self) {
        if self.degraded {
            debug!("companion write skipped while loads are failing");
            return;
        }
        let Some(user) = self.user_id.clone() else { return };
        let store = Arc::clone(&self.store);
        let record = self.companion.clone();
        let flag = Arc::clone(&self.needs_reconcile);
        tokio::spawn(async move {
            if let Err(e) = store.save_companion(&user, &record).await {
                warn!(user = %user, error = %e, "companion write failed, will reconcile on next refresh");
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    fn stash(&mut self, gain: &XpGain, notify: Option<Achievement>) {
        if gain.delta > 0 {
            self.recent_xp_gain = Some(gain.clone());
        }
        if notify.is_some() {
            self.new_achievement = notify;
        }
    }

    /// A completed focus session of `minutes`. Drives XP, streak, and both
    /// companions. Returns the XP gain for immediate display.
    pub async fn record_focus_session(&mut self, minutes: u32) -> XpGain {
        if self.user().is_none() {
            debug!("focus session ignored: not signed in");
            return XpGain::none();
        }
        if minutes == 0 {
            return XpGain::none();
        }
        self.ensure_loaded().await;

        let now = Utc::now();
        let outcome = ledger::record_focus_session(&mut self.progression, minutes, now, &self.config);
        apply_study_event(&mut self.companion, &self.progression, minutes, now, &self.config);

        self.stash(&outcome.gain, outcome.notify);
        self.spawn_save_progression();
        self.spawn_save_companion();
        outcome.gain
    }

    /// A spaced-repetition review happened. No streak, no companions.
    pub async fn record_review(&mut self) -> XpGain {
        if self.user().is_none() {
            return XpGain::none();
        }
        self.ensure_loaded().await;

        let outcome = ledger::record_review(&mut self.progression, &self.config);
        self.stash(&outcome.gain, outcome.notify);
        self.spawn_save_progression();
        outcome.gain
    }

    /// A mock exam was logged.
    pub async fn record_mock(&mut self) -> XpGain {
        if self.user().is_none() {
            return XpGain::none();
        }
        self.ensure_loaded().await;

        let outcome = ledger::record_mock(&mut self.progression, &self.config);
        self.stash(&outcome.gain, outcome.notify);
        self.spawn_save_progression();
        outcome.gain
    }

    /// A syllabus topic was checked off.
    pub async fn record_syllabus_topic(&mut self) -> XpGain {
        if self.user().is_none() {
            return XpGain::none();
        }
        self.ensure_loaded().await;

        let outcome = ledger::record_syllabus_topic(&mut self.progression, &self.config);
        self.stash(&outcome.gain, outcome.notify);
        self.spawn_save_progression();
        outcome.gain
    }

    /// Ad-hoc XP grant (quests, promos).
    pub async fn add_xp(&mut self, amount: u64, reason: &str) -> XpGain {
        if self.user().is_none() {
            return XpGain::none();
        }
        self.ensure_loaded().await;

        let outcome = ledger::add_xp(&mut self.progression, amount, reason);
        self.stash(&outcome.gain, outcome.notify);
        self.spawn_save_progression();
        outcome.gain
    }

    /// Configure the exam the wraith counts down to. Rejected before it
    /// reaches the automaton when the date is already behind us.
    pub async fn set_exam_date(&mut self, name: &str, date: StudyDay) -> Result<(), VigilError> {
        if self.user().is_none() {
            return Ok(());
        }
        let today = StudyDay::from_utc(Utc::now());
        if days_between(today, date) < 0 {
            return Err(VigilError::InvalidConfiguration(format!(
                "exam date {} is in the past",
                date
            )));
        }
        self.ensure_loaded().await;

        self.companion.exam_name = Some(name.to_string());
        self.companion.exam_date = Some(date);
        self.spawn_save_companion();
        Ok(())
    }

    /// Reload the authoritative rows, replenish an unused freeze, and run
    /// the idle tick. This is the reconciliation point after any failed
    /// fire-and-forget write.
    pub async fn refresh_stats(&mut self) {
        if self.user().is_none() {
            return;
        }
        self.needs_reconcile.store(true, Ordering::SeqCst); // force reload
        self.ensure_loaded().await;

        let now = Utc::now();
        if self.replenish_freeze(now) {
            self.spawn_save_progression();
        }
        if apply_idle_tick(
            &mut self.companion,
            &self.progression,
            self.progression.last_active_date,
            now,
            &self.config,
        ) {
            self.spawn_save_companion();
        }
    }

    /// Weekly freeze policy: a spent (or never-granted) freeze comes back
    /// after `freeze_replenish_days` without one being used. Evaluated only
    /// here, as a side effect of loading stats.
    fn replenish_freeze(&mut self, now: DateTime<Utc>) -> bool {
        if self.progression.streak_freezes_remaining >= 1 {
            return false;
        }
        let eligible = match self.progression.streak_freeze_used_at {
            Some(used_at) => (now - used_at).num_days() >= self.config.freeze_replenish_days,
            None => true,
        };
        if eligible {
            self.progression.streak_freezes_remaining = 1;
            debug!("streak freeze replenished");
        }
        eligible
    }

    /// Wipe both rows. The only sanctioned way progression goes backwards.
    pub async fn reset_all(&mut self) -> Result<(), VigilError> {
        let Some(user) = self.user_id.clone() else { return Ok(()) };
        self.store.delete_all(&user).await?;
        self.progression = ProgressionRecord::default();
        self.companion = CompanionRecord::default();
        self.recent_xp_gain = None;
        self.new_achievement = None;
        self.loaded = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn stats(&self) -> &ProgressionRecord {
        &self.progression
    }

    pub fn companion(&self) -> &CompanionRecord {
        &self.companion
    }

    pub fn level_info(&self) -> LevelInfo {
        let entry = level_for_xp(self.progression.xp);
        LevelInfo {
            level: entry.level,
            title: entry.title,
            next: next_level(self.progression.xp),
        }
    }

    /// Current guardian health, decayed from the value stored at the last
    /// feeding. The stored anchor is never mutated by reads.
    pub fn guardian_health(&self) -> f64 {
        decayed_health(
            self.companion.guardian_health,
            self.companion.guardian_last_fed,
            Utc::now(),
            &self.config.guardian,
        )
    }

    pub fn guardian_progress(&self) -> GuardianProgress {
        progress(
            self.companion.guardian_total_hours,
            self.companion.guardian_stage,
            &self.config.guardian,
        )
    }

    /// One-shot: the last XP gain, cleared on read.
    pub fn take_recent_xp_gain(&mut self) -> Option<XpGain> {
        self.recent_xp_gain.take()
    }

    /// One-shot: the last surfaced achievement, cleared on read.
    pub fn take_new_achievement(&mut self) -> Option<Achievement> {
        self.new_achievement.take()
    }
}
