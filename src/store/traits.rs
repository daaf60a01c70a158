//! Shared state store capability

use super::errors::StoreResult;
use std::time::Duration;

/// Key-value store with per-key expiry and set operations
///
/// The coordinator holds no batch state of its own; every component re-reads
/// from an implementation of this trait. [`set_pop`](Self::set_pop) must be
/// atomic with respect to concurrent callers: it is the claim primitive.
/// [`set_move`](Self::set_move) lets promotion move a batch without it ever
/// being in two sets.
pub trait BatchStore: Send + Sync {
    /// Read a string value, `None` when absent or expired
    fn get(&self, key: &str)
        -> impl std::future::Future<Output = StoreResult<Option<String>>> + Send;

    /// Write a string value with a time-to-live, replacing any previous value
    fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;

    /// Write a string value with a time-to-live only if the key is absent
    ///
    /// Returns `true` when the value was written.
    fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    fn exists(&self, key: &str) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    /// Delete keys, returning how many existed
    fn delete_many(
        &self,
        keys: &[String],
    ) -> impl std::future::Future<Output = StoreResult<u64>> + Send;

    /// Reset the time-to-live of an existing key; `false` if the key is absent
    fn expire(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    /// Add a member to a set, returning `true` if it was not already present
    fn set_add(
        &self,
        key: &str,
        member: &str,
    ) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    /// Remove a member from a set, returning `true` if it was present
    fn set_remove(
        &self,
        key: &str,
        member: &str,
    ) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    /// Atomically move a member from one set to another
    ///
    /// Returns `true` only for the caller that found the member in `source`.
    fn set_move(
        &self,
        source: &str,
        destination: &str,
        member: &str,
    ) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    /// All members of a set; empty when the set is absent
    fn set_members(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = StoreResult<Vec<String>>> + Send;

    /// Atomically remove and return one arbitrary member of a set
    fn set_pop(&self, key: &str)
        -> impl std::future::Future<Output = StoreResult<Option<String>>> + Send;

    fn health_check(&self) -> impl std::future::Future<Output = StoreResult<bool>> + Send;

    fn provider_name(&self) -> &'static str;
}
