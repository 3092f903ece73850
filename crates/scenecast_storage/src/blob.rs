//! Blob payloads.

use crate::address::ContentAddress;
use bytes::Bytes;

/// Content type of rendered videos
pub const VIDEO_MP4: &str = "video/mp4";

/// Bytes to upload, with their content type and digest
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone)]
pub struct Blob {
    data: Bytes,
    content_type: String,
    address: ContentAddress,
}

impl Blob {
    /// Create a new blob with content type
    #[must_use]
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        let data = data.into();
        let address = ContentAddress::compute(&data);
        Self {
            data,
            content_type: content_type.into(),
            address,
        }
    }

    /// Create an MP4 video blob
    #[must_use]
    pub fn video(data: impl Into<Bytes>) -> Self {
        Self::new(data, VIDEO_MP4)
    }

    /// Get content address
    #[must_use]
    pub const fn address(&self) -> ContentAddress {
        self.address
    }

    /// Get data bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the bytes
    #[must_use]
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    /// Get data size
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if blob is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get content type
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Check the bytes still hash to the recorded address
    #[must_use]
    pub fn verify(&self) -> bool {
        ContentAddress::compute(&self.data) == self.address
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.content_type == other.content_type
    }
}

impl Eq for Blob {}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
