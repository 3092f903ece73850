//! Unique identifiers for SCENECAST entities.
//!
//! All IDs are random UUIDs so concurrent renders never share a file name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Render identifier - identifies a single render request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderId(Uuid);

impl RenderId {
    /// Create a new random RenderId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// File name of the script written for this render
    #[must_use]
    pub fn script_file_name(&self) -> String {
        format!("scene_{}.py", self.0)
    }
}

impl Default for RenderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "render_{}", self.0)
    }
}

/// Destination pathname of an uploaded video inside the blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobPathname(String);

impl BlobPathname {
    /// Fresh `videos/<uuid>.mp4` pathname
    ///
    /// Independent of the render id so upload names are not guessable from logs.
    #[must_use]
    pub fn new_video() -> Self {
        Self(format!("videos/{}.mp4", Uuid::new_v4()))
    }

    /// Wrap an explicit pathname
    #[must_use]
    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobPathname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobPathname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
