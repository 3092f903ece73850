//! SCENECAST Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Errors, render identifiers and the script inspection helpers shared by
//! the worker and the client live here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod script;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use id::{BlobPathname, RenderId};
pub use script::{PreflightIssue, PreflightReport, find_scene_class, preflight, strip_code_fences};
