//! Render errors.

use scenecast_core::CoreError;
use thiserror::Error;

/// Error from a render attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The engine binary could not be started
    #[error("Failed to start renderer {program}: {reason}")]
    Spawn {
        /// Program that was invoked
        program: String,
        /// OS error
        reason: String,
    },
    /// The engine ran past its deadline and was killed
    #[error("Render timed out after {seconds}s")]
    Timeout {
        /// Configured deadline
        seconds: u64,
    },
    /// The engine exited unsuccessfully
    #[error("Renderer exited with status {}", exit_label(.status))]
    Failed {
        /// Exit code, `None` when killed by a signal
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
    /// The engine succeeded but no video for the scene was found
    #[error("Rendered video file not found for scene {scene}")]
    OutputMissing {
        /// Scene class that was rendered
        scene: String,
    },
    /// Workspace or file I/O failure
    #[error("IO error: {reason}")]
    Io {
        /// Underlying error message
        reason: String,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<CoreError> for RenderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io { reason } => Self::Io { reason },
            other => Self::Io {
                reason: other.to_string(),
            },
        }
    }
}

impl From<RenderError> for CoreError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout { .. } => CoreError::Timeout {
                operation: "render".to_string(),
            },
            RenderError::OutputMissing { scene } => CoreError::NotFound {
                kind: "Video".to_string(),
                id: scene,
            },
            other => CoreError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display() {
        let err = RenderError::Failed {
            status: Some(2),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Renderer exited with status 2");

        let err = RenderError::Failed {
            status: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Renderer exited with status signal");
    }

    #[test]
    fn test_into_core_error() {
        let core: CoreError = RenderError::Timeout { seconds: 180 }.into();
        assert!(matches!(core, CoreError::Timeout { .. }));

        let core: CoreError = RenderError::OutputMissing {
            scene: "ConceptScene".to_string(),
        }
        .into();
        assert_eq!(core.to_string(), "Video not found: ConceptScene");
    }
}
