//! Transactional write overlay.
//!
//! A [`Transaction`] buffers every write made by one message handler on
//! top of a base store. Reads (including range scans) see the buffered
//! writes. On success the buffer is committed as a single atomic batch; on
//! failure the transaction is dropped and the base store is untouched.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::traits::{BatchOp, Cursor, KvStore};

/// Buffered writes over a base store. `None` marks a pending delete.
pub struct Transaction<'a> {
    base: &'a dyn KvStore,
    writes: Mutex<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> Transaction<'a> {
    pub fn new(base: &'a dyn KvStore) -> Self {
        Self {
            base,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of keys with a pending write.
    pub async fn pending(&self) -> usize {
        self.writes.lock().await.len()
    }

    /// Consume the transaction, returning its buffered writes in key order.
    pub fn into_batch(self) -> Vec<BatchOp> {
        self.writes
            .into_inner()
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOp::Set { key, value },
                None => BatchOp::Delete { key },
            })
            .collect()
    }

    /// Apply every buffered write to the base store atomically.
    ///
    /// Returns the number of keys written.
    pub async fn commit(self) -> Result<usize> {
        let base = self.base;
        let ops = self.into_batch();
        let count = ops.len();
        if count > 0 {
            base.apply_batch(ops).await?;
        }
        tracing::debug!(keys = count, "committed transaction");
        Ok(count)
    }
}

#[async_trait]
impl KvStore for Transaction<'_> {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(pending) = self.writes.lock().await.get(key) {
            return Ok(pending.clone());
        }
        self.base.get(key).await
    }

    async fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.writes
            .lock()
            .await
            .insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.writes.lock().await.insert(key.to_vec(), None);
        Ok(())
    }

    async fn iterate(&self, start: &[u8], end: Option<&[u8]>) -> Result<Cursor> {
        let upper = match end {
            Some(end) if end <= start => return Ok(Cursor::default()),
            Some(end) => Bound::Excluded(end.to_vec()),
            None => Bound::Unbounded,
        };

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.iterate(start, end).await?.collect();

        let writes = self.writes.lock().await;
        for (key, pending) in writes.range((Bound::Included(start.to_vec()), upper)) {
            match pending {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(Cursor::new(merged.into_iter().collect()))
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        let mut writes = self.writes.lock().await;
        for op in ops {
            match op {
                BatchOp::Set { key, value } => {
                    writes.insert(key, Some(value));
                }
                BatchOp::Delete { key } => {
                    writes.insert(key, None);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::StoreExt;

    #[tokio::test]
    async fn test_reads_see_own_writes() {
        let base = MemoryStore::new();
        base.set(b"a", b"base").await.unwrap();

        let tx = Transaction::new(&base);
        tx.set(b"a", b"overlay").await.unwrap();
        tx.set(b"b", b"new").await.unwrap();

        assert_eq!(tx.get(b"a").await.unwrap(), Some(b"overlay".to_vec()));
        assert_eq!(tx.get(b"b").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(base.get(b"a").await.unwrap(), Some(b"base".to_vec()));
        assert!(!base.has(b"b").await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_delete_masks_base() {
        let base = MemoryStore::new();
        base.set(b"k/1", b"x").await.unwrap();
        base.set(b"k/2", b"y").await.unwrap();

        let tx = Transaction::new(&base);
        tx.delete(b"k/1").await.unwrap();
        tx.set(b"k/3", b"z").await.unwrap();

        assert!(!tx.has(b"k/1").await.unwrap());
        let keys: Vec<Vec<u8>> = tx
            .iterate_prefix(b"k/")
            .await
            .unwrap()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"k/2".to_vec(), b"k/3".to_vec()]);
    }

    #[tokio::test]
    async fn test_commit_applies_batch() {
        let base = MemoryStore::new();
        base.set(b"old", b"x").await.unwrap();

        let tx = Transaction::new(&base);
        tx.set(b"new", b"y").await.unwrap();
        tx.delete(b"old").await.unwrap();
        assert_eq!(tx.pending().await, 2);

        assert_eq!(tx.commit().await.unwrap(), 2);
        assert!(base.has(b"new").await.unwrap());
        assert!(!base.has(b"old").await.unwrap());
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let base = MemoryStore::new();
        {
            let tx = Transaction::new(&base);
            tx.set(b"never", b"1").await.unwrap();
        }
        assert!(base.is_empty().await);
    }
}
