//! Content-addressable blob storage for extended subject content.
//!
//! The ledger keeps only the address; the bytes live behind this port.
//! Addresses are opaque strings with an `ipfs://` prefix.

use std::collections::HashMap;

use academic_ledger_core::ContentHash;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Scheme prefix of every blob address.
pub const BLOB_ADDRESS_PREFIX: &str = "ipfs://";

/// Address derived from the Blake3 hash of the content.
pub fn blob_address(content: &[u8]) -> String {
    format!("{}{}", BLOB_ADDRESS_PREFIX, ContentHash::hash(content).to_hex())
}

/// Blob store port: `put(bytes) -> address`, `get(address) -> bytes`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store content and return its address. Storing the same bytes twice
    /// returns the same address.
    async fn put(&self, content: Bytes) -> Result<String>;

    /// Fetch content by address.
    async fn get(&self, address: &str) -> Result<Bytes>;
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, content: Bytes) -> Result<String> {
        let address = blob_address(&content);
        self.blobs.write().await.insert(address.clone(), content);
        Ok(address)
    }

    async fn get(&self, address: &str) -> Result<Bytes> {
        self.blobs
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let blobs = MemoryBlobStore::new();
        let address = blobs.put(Bytes::from_static(b"syllabus v1")).await.unwrap();

        assert!(address.starts_with(BLOB_ADDRESS_PREFIX));
        assert_eq!(blobs.get(&address).await.unwrap(), Bytes::from_static(b"syllabus v1"));
    }

    #[tokio::test]
    async fn test_same_content_same_address() {
        let blobs = MemoryBlobStore::new();
        let a = blobs.put(Bytes::from_static(b"x")).await.unwrap();
        let b = blobs.put(Bytes::from_static(b"x")).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let blobs = MemoryBlobStore::new();
        let err = blobs.get("ipfs://nothing").await.unwrap_err();
        assert!(matches!(err, StoreError::BlobNotFound(_)));
    }
}
