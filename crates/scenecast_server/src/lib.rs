//! SCENECAST Server
//!
//! HTTP render worker: accepts an animation script, renders it with the
//! external engine and answers with the public URL of the uploaded video.
//!
//! ```text
//! GET  /        - Health check
//! GET  /health  - Health check
//! POST /render  - {"code": "<python>"} -> {"videoUrl": "<url>"}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod observability;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiServer, AppState};
pub use auth::{AuthError, Authenticator};
pub use config::{BlobBackend, ConfigError, ConfigOverrides, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use observability::{LogFormat, init_logging};
