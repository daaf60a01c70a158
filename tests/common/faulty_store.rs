//! Store wrapper that fails chosen operations a set number of times

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use windowed_batcher::store::{BatchStore, InMemoryBatchStore, StoreError, StoreResult};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    SetWithTtl,
    SetIfAbsent,
    SetAdd,
    SetMove,
    SetMembers,
    SetPop,
    DeleteMany,
}

/// In-memory store that returns connection errors for queued failures
#[derive(Debug)]
pub struct FaultyStore {
    inner: InMemoryBatchStore,
    pending_failures: Mutex<HashMap<StoreOp, u32>>,
}

impl FaultyStore {
    pub fn new(inner: InMemoryBatchStore) -> Self {
        Self {
            inner,
            pending_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &InMemoryBatchStore {
        &self.inner
    }

    /// Fail the next `times` calls of `op`
    pub fn fail_next(&self, op: StoreOp, times: u32) {
        self.pending_failures.lock().insert(op, times);
    }

    /// Fail every call of `op` until cleared
    pub fn fail_always(&self, op: StoreOp) {
        self.fail_next(op, u32::MAX);
    }

    pub fn clear_failures(&self) {
        self.pending_failures.lock().clear();
    }

    fn check(&self, op: StoreOp) -> StoreResult<()> {
        let mut pending = self.pending_failures.lock();
        match pending.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                Err(StoreError::ConnectionError(format!(
                    "injected failure for {op:?}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl BatchStore for FaultyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check(StoreOp::Get)?;
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check(StoreOp::SetWithTtl)?;
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        self.check(StoreOp::SetIfAbsent)?;
        self.inner.set_if_absent_with_ttl(key, value, ttl).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        self.check(StoreOp::DeleteMany)?;
        self.inner.delete_many(keys).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check(StoreOp::SetAdd)?;
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.inner.set_remove(key, member).await
    }

    async fn set_move(&self, source: &str, destination: &str, member: &str) -> StoreResult<bool> {
        self.check(StoreOp::SetMove)?;
        self.inner.set_move(source, destination, member).await
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        self.check(StoreOp::SetMembers)?;
        self.inner.set_members(key).await
    }

    async fn set_pop(&self, key: &str) -> StoreResult<Option<String>> {
        self.check(StoreOp::SetPop)?;
        self.inner.set_pop(key).await
    }

    async fn health_check(&self) -> StoreResult<bool> {
        self.inner.health_check().await
    }

    fn provider_name(&self) -> &'static str {
        "faulty"
    }
}
