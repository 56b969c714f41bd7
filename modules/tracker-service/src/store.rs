//! Generic whole-collection read-modify-write over a `Storage` handle.
//!
//! Every mutation is load -> transform in memory -> save, performed while
//! holding the collection's writer lock. Reads take no lock; the backend
//! guarantees they see a complete snapshot.

use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;
use chrono::{SubsecRound, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracker_types::Timestamp;

/// Root object of one persisted collection.
///
/// `Default` is the content written when the collection is first created.
pub trait Collection: Serialize + DeserializeOwned + Default {
    /// Used in log lines and error messages
    const NAME: &'static str;

    /// Largest numeric record identifier currently held
    fn max_id(&self) -> Option<u64>;
}

/// Current time, truncated to the millisecond precision we persist.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Millisecond-timestamp identifier that is strictly greater than any id
/// already in the collection. Fails once the id space is exhausted.
pub fn next_id(max_existing: Option<u64>, at: Timestamp) -> StoreResult<String> {
    let millis = at.timestamp_millis().max(0) as u64;
    let id = match max_existing {
        Some(max) if max >= millis => max.checked_add(1).ok_or_else(|| {
            StoreError::Corrupt(format!("record id {} leaves no room for a newer id", max))
        })?,
        _ => millis,
    };
    Ok(id.to_string())
}

/// Parse a record id for `Collection::max_id`. Foreign ids are ignored.
pub fn numeric_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

pub struct RecordStore<C> {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
    _collection: PhantomData<fn() -> C>,
}

impl<C: Collection> RecordStore<C> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
            _collection: PhantomData,
        }
    }

    /// Seed the collection with its default content if nothing exists yet.
    /// Returns whether anything was written.
    pub fn initialize(&self) -> StoreResult<bool> {
        let _guard = self.write_lock.lock();
        if self.storage.exists()? {
            return Ok(false);
        }
        log::info!(
            "Seeding empty {} collection at {}",
            C::NAME,
            self.storage.describe()
        );
        self.write_state(&C::default())?;
        Ok(true)
    }

    /// Decode the full collection. A never-written collection loads as its
    /// default content.
    pub fn load(&self) -> StoreResult<C> {
        match self.storage.read()? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::Corrupt(format!(
                    "{} collection at {}: {}",
                    C::NAME,
                    self.storage.describe(),
                    e
                ))
            }),
            None => Ok(C::default()),
        }
    }

    /// Replace the persisted collection with `state`.
    pub fn save(&self, state: &C) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        self.write_state(state)
    }

    /// Load, apply `apply`, and save, as one exclusive section. If `apply`
    /// fails nothing is written.
    pub fn mutate<R>(&self, apply: impl FnOnce(&mut C) -> StoreResult<R>) -> StoreResult<R> {
        let _guard = self.write_lock.lock();
        let mut state = self.load()?;
        let result = apply(&mut state)?;
        self.write_state(&state)?;
        Ok(result)
    }

    fn write_state(&self, state: &C) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(state).map_err(|e| {
            StoreError::Io(format!("Failed to encode {} collection: {}", C::NAME, e))
        })?;
        self.storage.write(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use serde::Deserialize;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Notes {
        notes: Vec<Note>,
        stats: NoteStats,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        text: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NoteStats {
        total_notes: u64,
    }

    impl Collection for Notes {
        const NAME: &'static str = "notes";

        fn max_id(&self) -> Option<u64> {
            self.notes.iter().filter_map(|n| numeric_id(&n.id)).max()
        }
    }

    fn add_note(store: &RecordStore<Notes>, text: &str) -> StoreResult<String> {
        store.mutate(|state| {
            let id = next_id(state.max_id(), now())?;
            state.notes.insert(
                0,
                Note {
                    id: id.clone(),
                    text: text.to_string(),
                },
            );
            state.stats.total_notes += 1;
            Ok(id)
        })
    }

    fn memory_store() -> (Arc<MemoryStorage>, RecordStore<Notes>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_initialize_seeds_pretty_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("notes.json");
        let store: RecordStore<Notes> = RecordStore::new(Arc::new(FileStorage::new(&path)));

        assert!(store.initialize().unwrap());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"notes\": []"));
        assert_eq!(store.load().unwrap(), Notes::default());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (storage, store) = memory_store();
        assert!(store.initialize().unwrap());
        add_note(&store, "keep me").unwrap();
        let before = storage.read().unwrap();

        assert!(!store.initialize().unwrap());
        assert_eq!(storage.read().unwrap(), before);
    }

    #[test]
    fn test_load_missing_is_default() {
        let (_, store) = memory_store();
        assert_eq!(store.load().unwrap(), Notes::default());
    }

    #[test]
    fn test_load_malformed_is_corrupt() {
        let store: RecordStore<Notes> =
            RecordStore::new(Arc::new(MemoryStorage::with_contents("{\"notes\": [")));
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_load_wrong_root_is_corrupt() {
        let store: RecordStore<Notes> =
            RecordStore::new(Arc::new(MemoryStorage::with_contents("[1, 2, 3]")));
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));

        let store: RecordStore<Notes> =
            RecordStore::new(Arc::new(MemoryStorage::with_contents("{\"notes\": 5}")));
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let (storage, store) = memory_store();
        store.initialize().unwrap();
        let before = storage.read().unwrap();

        let result: StoreResult<()> = store.mutate(|state| {
            state.notes.push(Note {
                id: "1".to_string(),
                text: "half-done".to_string(),
            });
            Err(StoreError::validation("nope"))
        });

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(storage.read().unwrap(), before);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store: RecordStore<Notes> =
            RecordStore::new(Arc::new(FileStorage::new(dir.path().join("notes.json"))));
        let state = Notes {
            notes: vec![
                Note {
                    id: "2".to_string(),
                    text: "second".to_string(),
                },
                Note {
                    id: "1".to_string(),
                    text: "first\nwith \"quotes\" and ünïcode".to_string(),
                },
            ],
            stats: NoteStats { total_notes: 2 },
        };

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let at = now();
        let millis = at.timestamp_millis() as u64;

        assert_eq!(next_id(None, at).unwrap(), millis.to_string());
        assert_eq!(next_id(Some(millis - 10), at).unwrap(), millis.to_string());
        assert_eq!(next_id(Some(millis), at).unwrap(), (millis + 1).to_string());
        assert_eq!(next_id(Some(millis + 5), at).unwrap(), (millis + 6).to_string());
    }

    #[test]
    fn test_next_id_exhausted_is_corrupt() {
        assert!(matches!(
            next_id(Some(u64::MAX), now()),
            Err(StoreError::Corrupt(_))
        ));
        assert_eq!(
            next_id(Some(u64::MAX - 1), now()).unwrap(),
            u64::MAX.to_string()
        );
    }

    #[test]
    fn test_exhausted_ids_reject_append_and_keep_content() {
        let raw = format!(
            "{{\"notes\": [{{\"id\": \"{}\", \"text\": \"last\"}}], \"stats\": {{\"totalNotes\": 1}}}}",
            u64::MAX
        );
        let storage = Arc::new(MemoryStorage::with_contents(raw.clone()));
        let store: RecordStore<Notes> = RecordStore::new(storage.clone());

        assert!(matches!(add_note(&store, "more"), Err(StoreError::Corrupt(_))));
        assert_eq!(storage.read().unwrap(), Some(raw));
    }

    #[test]
    fn test_same_millisecond_ids_are_unique() {
        let (_, store) = memory_store();
        let ids: Vec<String> = (0..50).map(|i| add_note(&store, &i.to_string()).unwrap()).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let (_, store) = memory_store();
        store.initialize().unwrap();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..25 {
                        add_note(store, &format!("{}-{}", t, i)).unwrap();
                    }
                });
            }
        });

        let state = store.load().unwrap();
        assert_eq!(state.notes.len(), 200);
        assert_eq!(state.stats.total_notes, 200);
        let unique: HashSet<_> = state.notes.iter().map(|n| &n.id).collect();
        assert_eq!(unique.len(), 200);
    }
}
