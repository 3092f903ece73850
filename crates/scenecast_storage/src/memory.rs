//! In-memory blob store.

use crate::blob::Blob;
use crate::store::{BlobStore, StoreError, StoredBlob};
use async_trait::async_trait;
use scenecast_core::BlobPathname;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total number of blobs
    pub blob_count: usize,
    /// Total bytes stored
    pub total_bytes: u64,
    /// Number of uploads, overwrites included
    pub write_count: u64,
}

/// Blob store that keeps everything in process memory
pub struct MemoryBlobStore {
    /// URL prefix for returned locations
    base_url: String,
    /// Maximum blob size in bytes (0 = unlimited)
    max_blob_size: usize,
    blobs: RwLock<HashMap<String, Blob>>,
    stats: RwLock<MemoryStats>,
}

impl MemoryBlobStore {
    /// Create a store returning `memory://` URLs
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url("memory://")
    }

    /// Create a store returning `<base_url><pathname>` URLs
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_blob_size: 0,
            blobs: RwLock::new(HashMap::new()),
            stats: RwLock::new(MemoryStats::default()),
        }
    }

    /// Reject blobs larger than `limit` bytes
    #[must_use]
    pub fn with_max_blob_size(mut self, limit: usize) -> Self {
        self.max_blob_size = limit;
        self
    }

    /// Fetch a stored blob by pathname; `None` when absent or corrupted
    #[must_use]
    pub fn get(&self, pathname: &str) -> Option<Blob> {
        let blob = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pathname)
            .cloned()?;
        if !blob.verify() {
            tracing::error!(pathname, address = %blob.address(), "Stored blob failed integrity check");
            return None;
        }
        Some(blob)
    }

    /// List stored pathnames, sorted
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Get store statistics
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, pathname: &BlobPathname, blob: Blob) -> Result<StoredBlob, StoreError> {
        let size = blob.size();
        if self.max_blob_size > 0 && size > self.max_blob_size {
            return Err(StoreError::BlobTooLarge {
                size,
                limit: self.max_blob_size,
            });
        }

        let previous = self
            .blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pathname.as_str().to_string(), blob);

        {
            let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
            stats.write_count += 1;
            match previous {
                Some(old) => {
                    stats.total_bytes = stats.total_bytes - old.size() as u64 + size as u64;
                }
                None => {
                    stats.blob_count += 1;
                    stats.total_bytes += size as u64;
                }
            }
        }

        Ok(StoredBlob {
            url: format!("{}{}", self.base_url, pathname),
            pathname: pathname.as_str().to_string(),
            size,
        })
    }
}
