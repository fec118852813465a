//! SQLite implementation of the KvStore and BlobStore traits.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite, wrapped in
//! async via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use crate::blob::{blob_address, BlobStore};
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{BatchOp, Cursor, KvStore};

/// SQLite-based store implementation.
///
/// Thread-safe via an internal mutex. Every statement is prepared and
/// finalized inside a single blocking closure.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, creating and migrating it
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let key = key.to_vec();
        self.blocking(move |conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let key = key.to_vec();
        let value = value.to_vec();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let key = key.to_vec();
        self.blocking(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn has(&self, key: &[u8]) -> Result<bool> {
        let key = key.to_vec();
        self.blocking(move |conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn iterate(&self, start: &[u8], end: Option<&[u8]>) -> Result<Cursor> {
        let start = start.to_vec();
        let end = end.map(<[u8]>::to_vec);

        self.blocking(move |conn| {
            let entries = match end {
                Some(end) => {
                    let mut stmt = conn.prepare(
                        "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                    )?;
                    let rows = stmt.query_map(params![start, end], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?;
                    rows.collect::<rusqlite::Result<Vec<(Vec<u8>, Vec<u8>)>>>()?
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key")?;
                    let rows = stmt.query_map(params![start], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?;
                    rows.collect::<rusqlite::Result<Vec<(Vec<u8>, Vec<u8>)>>>()?
                }
            };
            Ok(Cursor::new(entries))
        })
        .await
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            for op in &ops {
                match op {
                    BatchOp::Set { key, value } => {
                        tx.execute(
                            "INSERT INTO kv (key, value) VALUES (?1, ?2)
                             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                            params![key, value],
                        )?;
                    }
                    BatchOp::Delete { key } => {
                        tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                    }
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn put(&self, content: Bytes) -> Result<String> {
        let address = blob_address(&content);
        let stored = address.clone();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO blobs (address, content, size, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    stored,
                    &content[..],
                    content.len() as i64,
                    chrono::Utc::now().timestamp_millis()
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(address)
    }

    async fn get(&self, address: &str) -> Result<Bytes> {
        let address = address.to_string();

        self.blocking(move |conn| {
            let content: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT content FROM blobs WHERE address = ?1",
                    params![address],
                    |row| row.get(0),
                )
                .optional()?;
            content
                .map(Bytes::from)
                .ok_or(StoreError::BlobNotFound(address))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = SqliteStore::open_memory().unwrap();

        store.set(b"Institution/value/institution-1", b"v").await.unwrap();
        assert_eq!(
            KvStore::get(&store, b"Institution/value/institution-1").await.unwrap(),
            Some(b"v".to_vec())
        );

        store.set(b"Institution/value/institution-1", b"v2").await.unwrap();
        assert_eq!(
            KvStore::get(&store, b"Institution/value/institution-1").await.unwrap(),
            Some(b"v2".to_vec())
        );

        store.delete(b"Institution/value/institution-1").await.unwrap();
        assert!(!store.has(b"Institution/value/institution-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_iterate_uses_byte_order() {
        let store = SqliteStore::open_memory().unwrap();
        for key in ["p/b", "p/a", "p/c", "q/a"] {
            store.set(key.as_bytes(), b"1").await.unwrap();
        }

        let keys: Vec<Vec<u8>> = store
            .iterate_prefix(b"p/")
            .await
            .unwrap()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"p/a".to_vec(), b"p/b".to_vec(), b"p/c".to_vec()]);

        let unbounded = store.iterate(b"p/c", None).await.unwrap();
        assert_eq!(unbounded.remaining(), 2);
    }

    #[tokio::test]
    async fn test_apply_batch_is_atomic_unit() {
        let store = SqliteStore::open_memory().unwrap();
        store.set(b"old", b"x").await.unwrap();

        store
            .apply_batch(vec![
                BatchOp::Set {
                    key: b"new".to_vec(),
                    value: b"y".to_vec(),
                },
                BatchOp::Delete {
                    key: b"old".to_vec(),
                },
            ])
            .await
            .unwrap();

        assert!(store.has(b"new").await.unwrap());
        assert!(!store.has(b"old").await.unwrap());
    }

    #[tokio::test]
    async fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set(b"Course/count/", &7u64.to_be_bytes()).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            KvStore::get(&store, b"Course/count/").await.unwrap(),
            Some(7u64.to_be_bytes().to_vec())
        );
    }

    #[tokio::test]
    async fn test_blob_roundtrip_through_sqlite() {
        let store = SqliteStore::open_memory().unwrap();
        let address = store.put(Bytes::from_static(b"lecture notes")).await.unwrap();

        let content = BlobStore::get(&store, &address).await.unwrap();
        assert_eq!(content, Bytes::from_static(b"lecture notes"));

        let missing = BlobStore::get(&store, "ipfs://missing").await;
        assert!(matches!(missing, Err(StoreError::BlobNotFound(_))));
    }
}
