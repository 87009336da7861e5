//! Elevator unlocks that survive floor changes and sessions, behind a key-value store.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{Depth, ELEVATOR_INTERVAL, ENTRANCE_DEPTH, MAX_DEPTH};

pub const ELEVATOR_DEPTHS_KEY: &str = "mine.elevator_depths";
pub const CURRENT_DEPTH_KEY: &str = "mine.current_depth";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("unsupported store format version {0}")]
    UnsupportedVersion(u32),
}

/// Persistent key-value surface shared with the save layer.
pub trait ProgressionStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn write(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }
}

impl ProgressionStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: ProgressionStore + ?Sized> ProgressionStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

pub fn is_valid_elevator_depth(depth: u64) -> bool {
    depth > 0 && depth <= u64::from(MAX_DEPTH) && depth % u64::from(ELEVATOR_INTERVAL) == 0
}

/// Grow-only set of unlocked elevator depths, written through to its store.
#[derive(Debug)]
pub struct ProgressionLedger<S: ProgressionStore> {
    store: S,
    unlocked: BTreeSet<u8>,
}

impl<S: ProgressionStore> ProgressionLedger<S> {
    /// Loads persisted unlocks, skipping anything that is not an elevator depth.
    pub fn open(store: S) -> Self {
        let unlocked = match store.read(ELEVATOR_DEPTHS_KEY) {
            Ok(Some(value)) => decode_depths(&value),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                warn!(error = %err, "could not read elevator unlocks; starting empty");
                BTreeSet::new()
            }
        };
        debug!(unlocked = unlocked.len(), "opened progression ledger");
        Self { store, unlocked }
    }

    /// Unlocks `depth` when it is an elevator stop. Returns whether it was newly added.
    pub fn record_visit(&mut self, depth: Depth) -> bool {
        if !depth.is_elevator_stop() || !self.unlocked.insert(depth.get()) {
            return false;
        }
        info!(depth = depth.get(), "elevator unlocked");
        self.persist_unlocks();
        true
    }

    pub fn unlocked_depths(&self) -> Vec<u8> {
        self.unlocked.iter().copied().collect()
    }

    pub fn is_unlocked(&self, depth: Depth) -> bool {
        self.unlocked.contains(&depth.get())
    }

    pub fn record_current_depth(&mut self, depth: Depth) {
        if let Err(err) = self.store.write(CURRENT_DEPTH_KEY, Value::from(depth.get())) {
            warn!(error = %err, depth = depth.get(), "failed to persist current depth");
        }
    }

    pub fn stored_current_depth(&self) -> Option<Depth> {
        match self.store.read(CURRENT_DEPTH_KEY) {
            Ok(value) => value.and_then(|value| value.as_i64()).map(|raw| {
                Depth::clamped(raw.clamp(i64::from(ENTRANCE_DEPTH), i64::from(MAX_DEPTH)) as i32)
            }),
            Err(err) => {
                warn!(error = %err, "could not read stored depth");
                None
            }
        }
    }

    /// Replaces the set wholesale, e.g. from a loaded save. Invalid entries are dropped.
    pub fn restore(&mut self, depths: &[u8]) {
        self.unlocked = depths
            .iter()
            .copied()
            .filter(|&depth| {
                let valid = is_valid_elevator_depth(u64::from(depth));
                if !valid {
                    warn!(depth, "ignoring invalid elevator depth");
                }
                valid
            })
            .collect();
        self.persist_unlocks();
    }

    /// Explicit new-game reset; the only path that shrinks the set.
    pub fn reset(&mut self) {
        self.unlocked.clear();
        for key in [ELEVATOR_DEPTHS_KEY, CURRENT_DEPTH_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(error = %err, key, "failed to clear progression key");
            }
        }
        info!("progression reset");
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_unlocks(&mut self) {
        let value = Value::from(self.unlocked_depths());
        if let Err(err) = self.store.write(ELEVATOR_DEPTHS_KEY, value) {
            warn!(error = %err, "failed to persist elevator unlocks");
        }
    }
}

fn decode_depths(value: &Value) -> BTreeSet<u8> {
    let Some(entries) = value.as_array() else {
        warn!(%value, "elevator unlocks are not a list; ignoring");
        return BTreeSet::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry.as_u64() {
            Some(depth) if is_valid_elevator_depth(depth) => Some(depth as u8),
            _ => {
                warn!(%entry, "ignoring invalid elevator depth");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FailingStore;

    impl ProgressionStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::UnsupportedVersion(99))
        }

        fn write(&mut self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::UnsupportedVersion(99))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::UnsupportedVersion(99))
        }
    }

    #[test]
    fn repeated_visits_unlock_once() {
        let mut ledger = ProgressionLedger::open(MemoryStore::new());
        assert!(ledger.record_visit(Depth::floor(15)));
        assert!(!ledger.record_visit(Depth::floor(15)));
        assert!(!ledger.record_visit(Depth::floor(17)));
        assert!(!ledger.record_visit(Depth::ENTRANCE));
        assert_eq!(ledger.unlocked_depths(), vec![15]);
    }

    #[test]
    fn unlocks_are_sorted_and_written_through() {
        let mut ledger = ProgressionLedger::open(MemoryStore::new());
        for depth in [40, 5, 120, 20] {
            ledger.record_visit(Depth::floor(depth));
        }
        assert_eq!(ledger.unlocked_depths(), vec![5, 20, 40, 120]);
        assert_eq!(
            ledger.store().read(ELEVATOR_DEPTHS_KEY).expect("memory read"),
            Some(json!([5, 20, 40, 120]))
        );
    }

    #[test]
    fn reopening_a_store_keeps_unlocks() {
        let mut ledger = ProgressionLedger::open(MemoryStore::new());
        ledger.record_visit(Depth::floor(10));
        let reopened = ProgressionLedger::open(ledger.into_store());
        assert!(reopened.is_unlocked(Depth::floor(10)));
    }

    #[test]
    fn open_drops_invalid_persisted_entries() {
        let mut store = MemoryStore::new();
        store
            .write(ELEVATOR_DEPTHS_KEY, json!([5, 7, 0, 125, -5, "ten", 60, 5]))
            .expect("memory write");
        let ledger = ProgressionLedger::open(store);
        assert_eq!(ledger.unlocked_depths(), vec![5, 60]);

        let mut store = MemoryStore::new();
        store.write(ELEVATOR_DEPTHS_KEY, json!({ "depth": 5 })).expect("memory write");
        assert!(ProgressionLedger::open(store).unlocked_depths().is_empty());
    }

    #[test]
    fn failing_store_degrades_to_memory_only() {
        let mut ledger = ProgressionLedger::open(FailingStore);
        assert!(ledger.record_visit(Depth::floor(25)));
        assert_eq!(ledger.unlocked_depths(), vec![25]);
        assert_eq!(ledger.stored_current_depth(), None);
        ledger.reset();
        assert!(ledger.unlocked_depths().is_empty());
    }

    #[test]
    fn reset_clears_set_and_keys() {
        let mut ledger = ProgressionLedger::open(MemoryStore::new());
        ledger.record_visit(Depth::floor(30));
        ledger.record_current_depth(Depth::floor(31));
        assert_eq!(ledger.stored_current_depth(), Some(Depth::floor(31)));

        ledger.reset();
        assert!(ledger.unlocked_depths().is_empty());
        assert!(ledger.store().entries().is_empty());
    }

    #[test]
    fn stored_depth_clamps_before_narrowing() {
        let mut store = MemoryStore::new();
        store.write(CURRENT_DEPTH_KEY, json!(4_294_967_301_i64)).expect("memory write");
        let mut ledger = ProgressionLedger::open(store);
        assert_eq!(ledger.stored_current_depth(), Some(Depth::BOTTOM));

        let below = json!(-9_000_000_000_i64);
        ledger.store_mut().write(CURRENT_DEPTH_KEY, below).expect("memory write");
        assert_eq!(ledger.stored_current_depth(), Some(Depth::ENTRANCE));
    }

    #[test]
    fn restore_replaces_set_with_valid_depths() {
        let mut ledger = ProgressionLedger::open(MemoryStore::new());
        ledger.record_visit(Depth::floor(50));
        ledger.restore(&[10, 11, 15]);
        assert_eq!(ledger.unlocked_depths(), vec![10, 15]);
    }
}
