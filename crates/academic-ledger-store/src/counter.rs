//! Sequential index counters.
//!
//! Each registry owns one counter key holding a big-endian `u64`. The
//! counter is read-modify-written through the same store view as the
//! record it numbers, so a failed message rolls back both together.

use crate::codec::{decode_u64, encode_u64};
use crate::error::{Result, StoreError};
use crate::traits::KvStore;

/// A durable, strictly increasing counter producing `"<label>-<n>"` ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    key: &'static str,
    label: &'static str,
}

impl Counter {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Last value handed out (0 if none).
    pub async fn current(&self, store: &dyn KvStore) -> Result<u64> {
        match store.get(self.key.as_bytes()).await? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(0),
        }
    }

    /// Increment, persist and return the new value.
    pub async fn next(&self, store: &dyn KvStore) -> Result<u64> {
        let next = self
            .current(store)
            .await?
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidData(format!("counter {} overflow", self.key)))?;
        store.set(self.key.as_bytes(), &encode_u64(next)).await?;
        Ok(next)
    }

    /// Increment and return the formatted index, e.g. `course-7`.
    pub async fn next_index(&self, store: &dyn KvStore) -> Result<String> {
        let n = self.next(store).await?;
        Ok(self.format(n))
    }

    pub fn format(&self, n: u64) -> String {
        format!("{}-{}", self.label, n)
    }
}
