//! KvStore trait: the ordered key-value interface every registry builds on.
//!
//! Implementations include SQLite (persistent), in-memory (tests) and the
//! [`Transaction`](crate::Transaction) overlay used per message.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::Result;

/// Value written for existence-only index entries.
pub const INDEX_MARKER: &[u8] = &[1];

/// A single write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Set { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Ordered `(key, value)` pairs produced by a range scan.
///
/// The cursor owns its entries; the backend's underlying iterator or
/// statement is already released by the time the cursor is returned, so
/// dropping the cursor early (including on `?` paths) leaks nothing.
#[derive(Debug, Default)]
pub struct Cursor {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl Cursor {
    pub fn new(entries: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }

    /// Number of entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl Iterator for Cursor {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

/// The smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xff`).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// The KvStore trait: async ordered key-value storage.
///
/// All methods are async so blocking backends (SQLite) can move work onto
/// `spawn_blocking` without stalling the runtime.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn delete(&self, key: &[u8]) -> Result<()>;

    /// Check if a key exists.
    async fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Scan `start <= key < end` in ascending key order. `None` means
    /// unbounded above.
    async fn iterate(&self, start: &[u8], end: Option<&[u8]>) -> Result<Cursor>;

    /// Apply a batch of writes atomically.
    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()>;
}

/// Extension trait with typed record helpers.
#[async_trait]
pub trait StoreExt: KvStore {
    /// Scan every key starting with `prefix`.
    async fn iterate_prefix(&self, prefix: &[u8]) -> Result<Cursor> {
        let end = prefix_end(prefix);
        self.iterate(prefix, end.as_deref()).await
    }

    /// Read and decode a CBOR record.
    async fn get_record<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a CBOR record.
    async fn set_record<T: Serialize + Sync>(&self, key: &[u8], value: &T) -> Result<()> {
        let bytes = codec::encode(value)?;
        self.set(key, &bytes).await
    }

    /// Decode every record under `prefix`, in key order.
    async fn records_with_prefix<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>> {
        let cursor = self.iterate_prefix(prefix).await?;
        cursor
            .map(|(_, value)| codec::decode(&value))
            .collect()
    }

    /// Key suffixes (after `prefix`) of every entry under `prefix`.
    ///
    /// Used to read marker indexes whose key ends with the referenced id.
    async fn suffixes_with_prefix(&self, prefix: &[u8]) -> Result<Vec<String>> {
        let cursor = self.iterate_prefix(prefix).await?;
        Ok(cursor
            .map(|(key, _)| String::from_utf8_lossy(&key[prefix.len()..]).into_owned())
            .collect())
    }

    /// Write an existence-only index entry.
    async fn set_marker(&self, key: &[u8]) -> Result<()> {
        self.set(key, INDEX_MARKER).await
    }
}

impl<S: KvStore + ?Sized> StoreExt for S {}
