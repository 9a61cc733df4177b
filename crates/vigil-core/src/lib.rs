//! Shared domain types and pure calculators for the Vigil progression
//! and companion engine.
//!
//! Everything in this crate is synchronous and side-effect free: stored
//! rows, the level table, the achievement catalog, streak math, the two
//! companion automata and the message generator. Persistence and
//! orchestration live in `vigil-engine`.

pub mod achievements;
pub mod calendar;
pub mod config;
pub mod error;
pub mod guardian;
pub mod levels;
pub mod messages;
pub mod records;
pub mod streaks;
pub mod wraith;

pub use calendar::StudyDay;
pub use config::EngineConfig;
pub use error::VigilError;
pub use guardian::GuardianStage;
pub use records::{CompanionKind, CompanionMessage, CompanionRecord, ProgressionRecord};
pub use streaks::StreakOutcome;
pub use wraith::{ExamUrgency, WraithStage};
