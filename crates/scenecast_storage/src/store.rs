//! Blob store seam.

use crate::blob::Blob;
use async_trait::async_trait;
use scenecast_core::{BlobPathname, CoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The request never got an answer
    #[error("Blob store unreachable: {reason}")]
    Transport {
        /// Client error
        reason: String,
    },
    /// The service answered with an error status
    #[error("Blob store rejected upload ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Service error message
        message: String,
    },
    /// The service answered 2xx with an unusable body
    #[error("Invalid blob store response: {reason}")]
    InvalidResponse {
        /// What was wrong
        reason: String,
    },
    /// The HTTP client could not be configured
    #[error("Blob store client setup failed: {reason}")]
    Client {
        /// Builder error
        reason: String,
    },
    /// Blob too large for the store
    #[error("Blob too large: {size} bytes (limit: {limit})")]
    BlobTooLarge {
        /// Blob size
        size: usize,
        /// Configured limit
        limit: usize,
    },
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}

/// Where an uploaded blob ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Public URL
    pub url: String,
    /// Pathname inside the store
    pub pathname: String,
    /// Uploaded size in bytes
    pub size: usize,
}

/// Upload target for rendered videos
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Upload `blob` at `pathname` and return its public location
    async fn put(&self, pathname: &BlobPathname, blob: Blob) -> Result<StoredBlob, StoreError>;
}
