//! Per-render scratch directories.
//!
//! Every render gets its own directory holding the script and the engine's
//! media output. The directory is removed when the workspace is dropped, on
//! success and on every error path alike.

use scenecast_core::{CoreError, CoreResult, RenderId};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the media directory inside a workspace
pub const MEDIA_DIR: &str = "media";

/// Isolated scratch directory for one render
#[derive(Debug)]
pub struct RenderWorkspace {
    id: RenderId,
    dir: TempDir,
}

impl RenderWorkspace {
    /// Create a workspace under `root`, or under the system temp dir when `None`
    ///
    /// Directory creation runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns error if the directories cannot be created
    pub async fn create(id: RenderId, root: Option<&Path>) -> CoreResult<Self> {
        let root = root.map(Path::to_path_buf);
        tokio::task::spawn_blocking(move || Self::create_blocking(id, root.as_deref()))
            .await
            .map_err(|e| CoreError::Internal {
                message: format!("workspace creation task failed: {e}"),
            })?
    }

    fn create_blocking(id: RenderId, root: Option<&Path>) -> CoreResult<Self> {
        let prefix = format!("{id}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        std::fs::create_dir(dir.path().join(MEDIA_DIR))?;

        tracing::debug!(render_id = %id, path = %dir.path().display(), "Created render workspace");
        Ok(Self { id, dir })
    }

    /// Render this workspace belongs to
    #[must_use]
    pub const fn id(&self) -> RenderId {
        self.id
    }

    /// Workspace root
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the script file
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.dir.path().join(self.id.script_file_name())
    }

    /// Directory handed to the engine for its output
    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.dir.path().join(MEDIA_DIR)
    }

    /// Write the script into the workspace and return its path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub async fn write_script(&self, code: &str) -> CoreResult<PathBuf> {
        let path = self.script_path();
        tokio::fs::write(&path, code).await?;
        Ok(path)
    }
}
