//! SCENECAST Storage
//!
//! Upload targets for rendered videos. The worker talks to a hosted blob
//! service over HTTP; an in-memory store stands in for it in tests and local
//! development.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod blob;
pub mod store;
pub mod memory;
pub mod http;

pub use address::ContentAddress;
pub use blob::{Blob, VIDEO_MP4};
pub use store::{BlobStore, StoreError, StoredBlob};
pub use memory::MemoryBlobStore;
pub use http::{DEFAULT_API_URL, HttpBlobStore, HttpStoreConfig};
