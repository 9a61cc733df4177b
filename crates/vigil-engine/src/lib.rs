//! Orchestration layer for the Vigil progression and companion engine.
//!
//! Wires the pure calculators from `vigil-core` to a row store: the XP
//! ledger applies event rewards, the coordinator merges both companion
//! automata into single upserts, and the facade is the one entry point a
//! caller holds per session.

pub mod coordinator;
pub mod facade;
pub mod ledger;
pub mod store;

pub use facade::{LevelInfo, ProgressionFacade};
pub use ledger::{LedgerOutcome, XpGain};
pub use store::{JsonFileStore, MemoryStore, RecordStore};
