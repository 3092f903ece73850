//! Renderer trait

use crate::error::RenderError;
use crate::workspace::RenderWorkspace;
use async_trait::async_trait;
use scenecast_core::{RenderId, find_scene_class};
use std::path::PathBuf;

/// A script to render and the scene class to render from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Request identifier
    pub id: RenderId,
    /// Python source handed to the engine
    pub script: String,
    /// Scene class name
    pub scene: String,
}

impl RenderRequest {
    /// Create a request with an explicit scene
    #[must_use]
    pub fn new(id: RenderId, script: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            id,
            script: script.into(),
            scene: scene.into(),
        }
    }

    /// Build a request from a script, picking its first `Scene` subclass.
    ///
    /// Returns `None` when the script declares no scene.
    #[must_use]
    pub fn from_script(id: RenderId, script: impl Into<String>) -> Option<Self> {
        let script = script.into();
        let scene = find_scene_class(&script)?.to_string();
        Some(Self { id, script, scene })
    }
}

/// A video file produced inside a workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVideo {
    /// Scene class the video belongs to
    pub scene: String,
    /// Location of the MP4 inside the workspace media directory
    pub path: PathBuf,
}

impl RenderedVideo {
    /// Read the whole video into memory
    ///
    /// # Errors
    ///
    /// Returns error if the file vanished or cannot be read
    pub async fn read_bytes(&self) -> Result<Vec<u8>, RenderError> {
        tokio::fs::read(&self.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                RenderError::OutputMissing {
                    scene: self.scene.clone(),
                }
            } else {
                err.into()
            }
        })
    }
}

/// Something that turns a script into a video file
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Render `request` inside `workspace`
    async fn render(
        &self,
        request: &RenderRequest,
        workspace: &RenderWorkspace,
    ) -> Result<RenderedVideo, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_script() {
        let id = RenderId::new();
        let req = RenderRequest::from_script(id, "class Intro(Scene):\n    pass").unwrap();
        assert_eq!(req.scene, "Intro");
        assert_eq!(req.id, id);
    }

    #[test]
    fn test_from_script_without_scene() {
        assert!(RenderRequest::from_script(RenderId::new(), "x = 1").is_none());
    }

    #[tokio::test]
    async fn test_read_bytes_missing_file() {
        let video = RenderedVideo {
            scene: "Gone".to_string(),
            path: PathBuf::from("/definitely/not/here/Gone.mp4"),
        };
        let err = video.read_bytes().await.unwrap_err();
        assert_eq!(
            err,
            RenderError::OutputMissing {
                scene: "Gone".to_string()
            }
        );
    }
}
