//! Row store for progression and companion records.
//!
//! The store is a dumb get/upsert collaborator keyed by user id:
//! last-write-wins, no concurrency tokens. A missing row loads as `None`
//! and callers fall back to zeroed defaults. `JsonFileStore` is the real
//! implementation; `MemoryStore` is the deterministic fake for tests,
//! with injectable write failures and write counters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use vigil_core::{CompanionRecord, ProgressionRecord, VigilError};

/// Persistent row store, two logical records per user.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_progression(&self, user_id: &str) -> Result<Option<ProgressionRecord>, VigilError>;
    async fn save_progression(&self, user_id: &str, record: &ProgressionRecord) -> Result<(), VigilError>;
    async fn load_companion(&self, user_id: &str) -> Result<Option<CompanionRecord>, VigilError>;
    async fn save_companion(&self, user_id: &str, record: &CompanionRecord) -> Result<(), VigilError>;
    /// Explicit external full reset: both rows are gone afterwards.
    async fn delete_all(&self, user_id: &str) -> Result<(), VigilError>;
}

// ============================================================================
// JSON file store (production)
// ============================================================================

/// One JSON file per user per record under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Store under the platform data directory.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("vigil"))
    }

    fn progression_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(user_id).join("progression.json")
    }

    fn companion_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(user_id).join("companion.json")
    }

    fn read_row<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, VigilError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        match serde_json::from_str(&json) {
            Ok(row) => Ok(Some(row)),
            Err(e) => {
                // A corrupt row is treated as missing; the next save rewrites it.
                warn!(path = %path.display(), error = %e, "skipping unreadable record");
                Ok(None)
            }
        }
    }

    fn write_row<T: serde::Serialize>(path: &Path, row: &T) -> Result<(), VigilError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(row)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load_progression(&self, user_id: &str) -> Result<Option<ProgressionRecord>, VigilError> {
        Self::read_row(&self.progression_path(user_id))
    }

    async fn save_progression(&self, user_id: &str, record: &ProgressionRecord) -> Result<(), VigilError> {
        Self::write_row(&self.progression_path(user_id), record)
    }

    async fn load_companion(&self, user_id: &str) -> Result<Option<CompanionRecord>, VigilError> {
        Self::read_row(&self.companion_path(user_id))
    }

    async fn save_companion(&self, user_id: &str, record: &CompanionRecord) -> Result<(), VigilError> {
        Self::write_row(&self.companion_path(user_id), record)
    }

    async fn delete_all(&self, user_id: &str) -> Result<(), VigilError> {
        let user_dir = self.dir.join(user_id);
        if user_dir.exists() {
            std::fs::remove_dir_all(&user_dir)?;
        }
        Ok(())
    }
}

// ============================================================================
// Memory store (testing)
// ============================================================================

#[derive(Default, Clone)]
struct UserRows {
    progression: Option<ProgressionRecord>,
    companion: Option<CompanionRecord>,
}

/// In-memory fake for deterministic tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, UserRows>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, for exercising the
    /// optimistic-then-reconcile path.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent load fail, for exercising the degraded-session
    /// path.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves across both record kinds.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Overwrite the stored progression row directly (test setup).
    pub fn seed_progression(&self, user_id: &str, record: ProgressionRecord) {
        let mut rows = self.rows.lock().unwrap();
        rows.entry(user_id.to_string()).or_default().progression = Some(record);
    }

    /// Overwrite the stored companion row directly (test setup).
    pub fn seed_companion(&self, user_id: &str, record: CompanionRecord) {
        let mut rows = self.rows.lock().unwrap();
        rows.entry(user_id.to_string()).or_default().companion = Some(record);
    }

    fn check_write(&self) -> Result<(), VigilError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(VigilError::Persistence("injected write failure".to_string()));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_read(&self) -> Result<(), VigilError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(VigilError::Persistence("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_progression(&self, user_id: &str) -> Result<Option<ProgressionRecord>, VigilError> {
        self.check_read()?;
        Ok(self.rows.lock().unwrap().get(user_id).and_then(|r| r.progression.clone()))
    }

    async fn save_progression(&self, user_id: &str, record: &ProgressionRecord) -> Result<(), VigilError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        rows.entry(user_id.to_string()).or_default().progression = Some(record.clone());
        Ok(())
    }

    async fn load_companion(&self, user_id: &str) -> Result<Option<CompanionRecord>, VigilError> {
        self.check_read()?;
        Ok(self.rows.lock().unwrap().get(user_id).and_then(|r| r.companion.clone()))
    }

    async fn save_companion(&self, user_id: &str, record: &CompanionRecord) -> Result<(), VigilError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        rows.entry(user_id.to_string()).or_default().companion = Some(record.clone());
        Ok(())
    }

    async fn delete_all(&self, user_id: &str) -> Result<(), VigilError> {
        self.rows.lock().unwrap().remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(store.load_progression("alice").await.unwrap().is_none());

        let mut rec = ProgressionRecord::default();
        rec.xp = 140;
        rec.refresh_level();
        store.save_progression("alice", &rec).await.unwrap();

        let loaded = store.load_progression("alice").await.unwrap().unwrap();
        assert_eq!(loaded.xp, 140);
        assert_eq!(loaded.level, 2);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_row_loads_as_missing() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let path = dir.path().join("bob");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("progression.json"), "not json {").unwrap();

        assert!(store.load_progression("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_delete_all() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save_progression("carol", &ProgressionRecord::default()).await.unwrap();
        store.save_companion("carol", &CompanionRecord::default()).await.unwrap();
        store.delete_all("carol").await.unwrap();

        assert!(store.load_progression("carol").await.unwrap().is_none());
        assert!(store.load_companion("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        let rec = ProgressionRecord::default();

        store.save_progression("dave", &rec).await.unwrap();
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(true);
        assert!(store.save_progression("dave", &rec).await.is_err());
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(false);
        store.save_progression("dave", &rec).await.unwrap();
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_read_failure_injection() {
        let store = MemoryStore::new();
        store.save_progression("gail", &ProgressionRecord::default()).await.unwrap();

        store.set_fail_reads(true);
        assert!(store.load_progression("gail").await.is_err());
        assert!(store.load_companion("gail").await.is_err());

        store.set_fail_reads(false);
        assert!(store.load_progression("gail").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stores_are_per_user() {
        let store = MemoryStore::new();
        let mut rec = ProgressionRecord::default();
        rec.xp = 10;
        store.save_progression("erin", &rec).await.unwrap();

        assert!(store.load_progression("frank").await.unwrap().is_none());
        assert_eq!(store.load_progression("erin").await.unwrap().unwrap().xp, 10);
    }
}
