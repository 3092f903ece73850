//! SCENECAST Render
//!
//! Runs the external animation engine against a script in an isolated
//! workspace and locates the video it produced.
//! The engine is treated as untrusted: bounded by a timeout and killed on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod trait_;
pub mod settings;
pub mod workspace;
pub mod runner;
pub mod discover;
pub mod error;

pub use trait_::{RenderRequest, RenderedVideo, Renderer};
pub use settings::{Quality, RenderSettings};
pub use workspace::RenderWorkspace;
pub use runner::ManimRenderer;
pub use discover::find_output;
pub use error::RenderError;
