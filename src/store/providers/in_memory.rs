//! In-memory store provider
//!
//! Single-process store with per-key expiry evaluated against an injected
//! [`Clock`]. Every operation runs under one mutex, so `set_pop` is atomic and
//! the whole store is linearizable. Expired keys are treated as absent and
//! purged lazily on access.
//!
//! **Important**: state is NOT shared across processes. Use it for tests and
//! single-instance development runs only.

use crate::clock::{duration_millis, Clock};
use crate::store::errors::{StoreError, StoreResult};
use crate::store::traits::BatchStore;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: StoredValue,
    /// Absolute expiry in clock milliseconds; `None` never expires
    expires_at: Option<i64>,
}

impl Entry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory batch store
pub struct InMemoryBatchStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryBatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBatchStore")
            .field("entry_count", &self.entries.lock().len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl InMemoryBatchStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live keys, for assertions in tests
    pub fn live_key_count(&self) -> usize {
        let now = self.clock.now_millis();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Remaining time-to-live of a key in milliseconds
    ///
    /// `None` when the key is absent or has no expiry.
    pub fn ttl_millis(&self, key: &str) -> Option<i64> {
        let now = self.clock.now_millis();
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at - now)
    }

    fn expiry_from(&self, ttl: Duration) -> i64 {
        self.clock.now_millis().saturating_add(duration_millis(ttl))
    }
}

/// Drop the entry if it has expired and return the live one, if any
fn live_entry<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
    now: i64,
) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn wrong_type(key: &str, operation: &str) -> StoreError {
    StoreError::backend(
        operation,
        format!("WRONGTYPE operation against key '{}' holding the wrong kind of value", key),
    )
}

impl BatchStore for InMemoryBatchStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key, now) {
            None => Ok(None),
            Some(Entry {
                value: StoredValue::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            Some(_) => Err(wrong_type(key, "GET")),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let expires_at = self.expiry_from(ttl);
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: StoredValue::Text(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let expires_at = self.expiry_from(ttl);
        let mut entries = self.entries.lock();
        if live_entry(&mut entries, key, now).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: StoredValue::Text(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        Ok(true)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        Ok(live_entry(&mut entries, key, now).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let deleted = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| entry.is_live(now))
            .count() as u64;

        debug!(requested = keys.len(), deleted = deleted, "Store DEL (memory)");
        Ok(deleted)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let expires_at = self.expiry_from(ttl);
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key, now) {
            Some(entry) => {
                entry.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        if live_entry(&mut entries, key, now).is_none() {
            entries.insert(
                key.to_string(),
                Entry {
                    value: StoredValue::Set(HashSet::new()),
                    expires_at: None,
                },
            );
        }

        match entries.get_mut(key).map(|entry| &mut entry.value) {
            Some(StoredValue::Set(members)) => Ok(members.insert(member.to_string())),
            _ => Err(wrong_type(key, "SADD")),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let (removed, now_empty) = match live_entry(&mut entries, key, now) {
            None => return Ok(false),
            Some(Entry {
                value: StoredValue::Set(members),
                ..
            }) => (members.remove(member), members.is_empty()),
            Some(_) => return Err(wrong_type(key, "SREM")),
        };

        // Empty sets cease to exist
        if now_empty {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn set_move(&self, source: &str, destination: &str, member: &str) -> StoreResult<bool> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        if live_entry(&mut entries, destination, now)
            .is_some_and(|entry| !matches!(entry.value, StoredValue::Set(_)))
        {
            return Err(wrong_type(destination, "SMOVE"));
        }

        let (moved, now_empty) = match live_entry(&mut entries, source, now) {
            None => return Ok(false),
            Some(Entry {
                value: StoredValue::Set(members),
                ..
            }) => (members.remove(member), members.is_empty()),
            Some(_) => return Err(wrong_type(source, "SMOVE")),
        };

        if now_empty {
            entries.remove(source);
        }
        if !moved {
            return Ok(false);
        }

        let target = entries
            .entry(destination.to_string())
            .or_insert_with(|| Entry {
                value: StoredValue::Set(HashSet::new()),
                expires_at: None,
            });
        match &mut target.value {
            StoredValue::Set(members) => {
                members.insert(member.to_string());
                Ok(true)
            }
            StoredValue::Text(_) => Err(wrong_type(destination, "SMOVE")),
        }
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key, now) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: StoredValue::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key, "SMEMBERS")),
        }
    }

    async fn set_pop(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let (popped, now_empty) = match live_entry(&mut entries, key, now) {
            None => return Ok(None),
            Some(Entry {
                value: StoredValue::Set(members),
                ..
            }) => {
                let popped = members.iter().next().cloned();
                if let Some(member) = &popped {
                    members.remove(member);
                }
                (popped, members.is_empty())
            }
            Some(_) => return Err(wrong_type(key, "SPOP")),
        };

        if now_empty {
            entries.remove(key);
        }
        Ok(popped)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
