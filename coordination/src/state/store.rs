//! In-memory shared state store.
//!
//! The store is a cheap `Clone` handle over one `RwLock`ed map, so every
//! component of a run sees the same canonical data. Each operation takes the
//! lock exactly once, which makes `append` atomic per call even if two writers
//! ever target the same key. The lock is never held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::types::{StateSnapshot, StateValue};

/// Run-scoped key/value store shared by every role.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<HashMap<String, StateValue>>>,
}

impl SharedState {
    /// Create an empty store for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single insert or push; a poisoned map is still whole.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, StateValue>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, StateValue>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.read().get(key).cloned()
    }

    /// Overwrite `key` with a scalar.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.write()
            .insert(key.to_string(), StateValue::Scalar(value.into()));
    }

    /// Append `content` to the sequence at `key`.
    ///
    /// Creates the sequence if absent and coerces an existing scalar into a
    /// one-element sequence first. Returns the sequence length after the push.
    pub fn append(&self, key: &str, content: impl Into<String>) -> usize {
        let content = content.into();
        let mut map = self.write();
        let len = match map.get_mut(key) {
            Some(existing) => existing.push(content),
            None => {
                map.insert(key.to_string(), StateValue::List(vec![content]));
                1
            }
        };
        debug!(key, len, "state append");
        len
    }

    /// Sequence view of `key` (scalar → one element, absent → empty).
    pub fn list(&self, key: &str) -> Vec<String> {
        self.read()
            .get(key)
            .map(StateValue::to_list)
            .unwrap_or_default()
    }

    /// Number of entries in the sequence at `key`.
    pub fn count(&self, key: &str) -> usize {
        match self.read().get(key) {
            Some(StateValue::List(items)) => items.len(),
            Some(StateValue::Scalar(_)) => 1,
            None => 0,
        }
    }

    /// Consistent copy of every key, taken under a single read lock.
    pub fn snapshot(&self) -> StateSnapshot {
        let map = self.read();
        let entries: BTreeMap<String, StateValue> =
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        StateSnapshot::new(entries)
    }
}
