//! # Academic Ledger Store
//!
//! Storage abstraction for the Academic Ledger. Provides the ordered
//! key-value interface every registry is built on, with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! Registries never talk to a database directly. They read and write
//! through [`KvStore`], usually via a per-message [`Transaction`] overlay
//! wrapped in a [`Context`]. Typed CBOR access and marker indexes come from
//! [`StoreExt`]; sequential ids come from [`Counter`].
//!
//! ## Key Types
//!
//! - [`KvStore`] - The async trait for ordered key-value storage
//! - [`SqliteStore`] - SQLite-based persistent storage (also a [`BlobStore`])
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Transaction`] - Buffered writes committed as one atomic batch
//! - [`Context`] - Store view, block time and emitted events for one message
//! - [`BlobStore`] - Content-addressed storage for extended content
//!
//! ## Usage
//!
//! ```rust,no_run
//! use academic_ledger_store::{KvStore, SqliteStore, StoreExt, Transaction};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Buffer writes, then commit them atomically
//!     let tx = Transaction::new(&store);
//!     tx.set(b"Course/value/course-1", b"...").await.unwrap();
//!     tx.commit().await.unwrap();
//!
//!     // Prefix scans return an owned cursor
//!     let cursor = store.iterate_prefix(b"Course/value/").await.unwrap();
//!     for (key, _value) in cursor {
//!         println!("{}", String::from_utf8_lossy(&key));
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Byte-wise key order**: both backends order keys with memcmp semantics
//! - **Owned cursors**: range scans are materialized before returning, so
//!   no backend iterator outlives the call
//! - **Atomic batches**: `apply_batch` runs in one SQLite transaction

pub mod blob;
pub mod codec;
pub mod context;
pub mod counter;
pub mod error;
pub mod memory;
pub mod migration;
pub mod overlay;
pub mod sqlite;
pub mod traits;

pub use blob::{blob_address, BlobStore, MemoryBlobStore, BLOB_ADDRESS_PREFIX};
pub use context::Context;
pub use counter::Counter;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use overlay::Transaction;
pub use sqlite::SqliteStore;
pub use traits::{prefix_end, BatchOp, Cursor, KvStore, StoreExt, INDEX_MARKER};
