//! Where knowledge snapshots live between games.
//!
//! A [`KnowledgeStore`] only has to read and write one document. Loading,
//! migration, eviction and import validation are shared by every store.

use crate::knowledge::{migrate, parse_snapshot, validate_import, KnowledgeSnapshot};
use crate::memory::MemoryConfig;
use derive_more::{Display, Error};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display(fmt = "knowledge store I/O failed: {}", source)]
    Io { source: io::Error },
    #[display(fmt = "could not serialize snapshot: {}", source)]
    Serialize { source: serde_json::Error },
    #[display(fmt = "stored snapshot is corrupted: {}", reason)]
    CorruptedSnapshot { reason: String },
    #[display(fmt = "import rejected: {}", reason)]
    InvalidImport { reason: String },
    #[display(fmt = "snapshot of {} bytes exceeds the {} byte quota", size, quota)]
    QuotaExceeded { size: usize, quota: usize },
}

impl From<io::Error> for StoreError {
    fn from(source: io::Error) -> Self {
        StoreError::Io { source }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(source: serde_json::Error) -> Self {
        StoreError::Serialize { source }
    }
}

/// Durable storage for a single [`KnowledgeSnapshot`].
pub trait KnowledgeStore {
    /// The stored document, or None if nothing has been saved yet.
    fn read_raw(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored document. Must not leave a partial document behind on failure.
    fn write_raw(&mut self, document: &str) -> Result<(), StoreError>;

    /// Load the stored snapshot. A missing or unreadable document gives a fresh snapshot.
    fn load(&self) -> Result<KnowledgeSnapshot, StoreError> {
        let document = match self.read_raw()? {
            Some(document) => document,
            None => {
                info!("no stored knowledge, starting fresh");
                return Ok(KnowledgeSnapshot::default());
            }
        };

        match parse_snapshot(&document) {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                warn!(%err, "stored knowledge is unusable, starting fresh");
                Ok(KnowledgeSnapshot::default())
            }
        }
    }

    /// Evict surplus memory entries from `snapshot`, then write it.
    fn save(
        &mut self,
        snapshot: &mut KnowledgeSnapshot,
        config: &MemoryConfig,
    ) -> Result<(), StoreError> {
        let evicted = snapshot
            .memory
            .prune_if_needed(snapshot.memory_capacity, config);
        if evicted > 0 {
            debug!(
                evicted,
                remaining = snapshot.memory.len(),
                "pruned learning memory"
            );
        }

        let document = serde_json::to_string_pretty(snapshot)?;
        self.write_raw(&document)
    }

    /// Validate and store an exported document. On failure the stored data is untouched.
    fn import(&mut self, document: &str) -> Result<KnowledgeSnapshot, StoreError> {
        let value: Value =
            serde_json::from_str(document).map_err(|err| StoreError::InvalidImport {
                reason: err.to_string(),
            })?;
        validate_import(&value)?;

        let snapshot = migrate(value)?;
        self.write_raw(&serde_json::to_string_pretty(&snapshot)?)?;
        info!(
            total_games = snapshot.total_games,
            entries = snapshot.memory.len(),
            "imported knowledge"
        );
        Ok(snapshot)
    }

    /// The stored snapshot as pretty-printed JSON.
    fn export(&self) -> Result<String, StoreError> {
        let snapshot = self.load()?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

/// Stores the snapshot as one JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KnowledgeStore for JsonFileStore {
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_raw(&mut self, document: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Readers only ever see the old file or the complete new one.
        let temp = self.temp_path();
        fs::write(&temp, document)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Keeps the snapshot in memory, optionally limited to `quota` bytes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: Option<String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            document: None,
            quota: Some(quota),
        }
    }

    /// The stored document, exactly as written.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl KnowledgeStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        Ok(self.document.clone())
    }

    fn write_raw(&mut self, document: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            if document.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    size: document.len(),
                    quota,
                });
            }
        }

        self.document = Some(document.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEntry;
    use chrono::{TimeZone, Utc};
    use recall_othello::{Board, Cell, Location};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("recall-store-{}-{}", std::process::id(), id))
            .join(name)
    }

    #[test]
    fn missing_or_garbage_loads_default() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), KnowledgeSnapshot::default());

        store.write_raw("[]").unwrap();
        assert_eq!(store.load().unwrap(), KnowledgeSnapshot::default());
    }

    #[test]
    fn save_prunes_before_writing() {
        let config = MemoryConfig::default();
        let mut snapshot = KnowledgeSnapshot {
            memory_capacity: 4,
            ..KnowledgeSnapshot::default()
        };
        let base = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        for i in 0..10u8 {
            let board = Board::empty().with_cell(Location::from_index(i), Cell::Black);
            snapshot.memory.insert(
                board.fingerprint(),
                MemoryEntry {
                    location: Location::from_index(0),
                    confidence: i as u32,
                    updated_at: base,
                },
            );
        }

        let mut store = MemoryStore::new();
        store.save(&mut snapshot, &config).unwrap();
        assert_eq!(snapshot.memory.len(), 4);

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);
        let confidences: Vec<u32> = loaded
            .memory
            .ranked()
            .into_iter()
            .map(|(_, entry)| entry.confidence)
            .collect();
        assert_eq!(confidences, vec![9, 8, 7, 6]);
    }

    #[test]
    fn quota_is_enforced() {
        let mut store = MemoryStore::with_quota(16);
        let mut snapshot = KnowledgeSnapshot::default();
        let err = store
            .save(&mut snapshot, &MemoryConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 16, .. }));
        assert!(store.document().is_none());
    }

    #[test]
    fn failed_import_leaves_data_untouched() {
        let mut store = MemoryStore::new();
        let mut snapshot = KnowledgeSnapshot {
            total_games: 7,
            ..KnowledgeSnapshot::default()
        };
        store.save(&mut snapshot, &MemoryConfig::default()).unwrap();
        let before = store.document().unwrap().to_owned();

        for bad in &["not json", "{}", r#"{"totalGames": 1, "weights": [], "memory": {}}"#] {
            assert!(matches!(
                store.import(bad),
                Err(StoreError::InvalidImport { .. })
            ));
            assert_eq!(store.document().unwrap(), before);
        }
    }

    #[test]
    fn import_fills_optional_fields() {
        let mut store = MemoryStore::new();
        let document = json!({
            "totalGames": 3,
            "weights": vec![vec![1.5; 8]; 8],
            "memory": {},
        })
        .to_string();

        let imported = store.import(&document).unwrap();
        assert_eq!(imported.total_games, 3);
        assert_eq!(imported.wins, 0);
        assert_eq!(imported.weights, recall_search::Weights::uniform(1.5));
        assert_eq!(store.load().unwrap(), imported);
    }

    #[test]
    fn huge_imported_capacity_still_saves() {
        let mut store = MemoryStore::new();
        let document = json!({
            "totalGames": 0,
            "weights": recall_search::Weights::default(),
            "memory": {},
            "memoryCapacity": u64::MAX,
        })
        .to_string();

        let mut imported = store.import(&document).unwrap();
        assert_eq!(imported.memory_capacity as u64, u64::MAX);

        let board = Board::empty().with_cell(Location::from_index(5), Cell::White);
        imported.memory.insert(
            board.fingerprint(),
            MemoryEntry {
                location: Location::from_index(0),
                confidence: 1,
                updated_at: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            },
        );
        store.save(&mut imported, &MemoryConfig::default()).unwrap();
        assert_eq!(store.load().unwrap().memory.len(), 1);
    }

    #[test]
    fn export_then_import_preserves_everything() {
        let mut source = MemoryStore::new();
        let mut snapshot = KnowledgeSnapshot {
            total_games: 11,
            wins: 6,
            losses: 4,
            draws: 1,
            experience: 30,
            ..KnowledgeSnapshot::default()
        };
        source.save(&mut snapshot, &MemoryConfig::default()).unwrap();

        let mut target = MemoryStore::new();
        let imported = target.import(&source.export().unwrap()).unwrap();
        assert_eq!(imported, snapshot);
    }

    #[test]
    fn file_store_round_trips_and_leaves_no_temp_file() {
        let path = scratch_path("knowledge.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.read_raw().unwrap(), None);

        let mut snapshot = KnowledgeSnapshot {
            total_games: 2,
            ..KnowledgeSnapshot::default()
        };
        store.save(&mut snapshot, &MemoryConfig::default()).unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), snapshot);

        if let Some(dir) = path.parent() {
            fs::remove_dir_all(dir).unwrap();
        }
    }
}
