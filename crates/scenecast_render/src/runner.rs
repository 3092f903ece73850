//! Engine subprocess execution.

use crate::discover::find_output;
use crate::error::RenderError;
use crate::settings::RenderSettings;
use crate::trait_::{RenderRequest, RenderedVideo, Renderer};
use crate::workspace::RenderWorkspace;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Renderer that shells out to the Manim command-line tool
#[derive(Debug, Clone, Default)]
pub struct ManimRenderer {
    settings: RenderSettings,
}

impl ManimRenderer {
    /// Create a renderer with the given settings
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// Get settings
    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Build the engine command line for one render.
    ///
    /// `<program> [program_args] -q<x> --media_dir <media> [extra_args] <script> <scene>`
    #[must_use]
    pub fn command(&self, workspace: &RenderWorkspace, script: &Path, scene: &str) -> Command {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(&self.settings.program_args)
            .arg(self.settings.quality.flag())
            .arg("--media_dir")
            .arg(workspace.media_dir())
            .args(&self.settings.extra_args)
            .arg(script)
            .arg(scene)
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Renderer for ManimRenderer {
    fn name(&self) -> &str {
        "manim"
    }

    async fn render(
        &self,
        request: &RenderRequest,
        workspace: &RenderWorkspace,
    ) -> Result<RenderedVideo, RenderError> {
        let script = workspace.write_script(&request.script).await?;
        let mut cmd = self.command(workspace, &script, &request.scene);

        tracing::info!(
            render_id = %request.id,
            scene = %request.scene,
            quality = ?self.settings.quality,
            "Starting engine"
        );

        let child = cmd.spawn().map_err(|err| RenderError::Spawn {
            program: self.settings.program.clone(),
            reason: err.to_string(),
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        // Only the direct child is signalled: helpers the engine spawned itself
        // (ffmpeg) may outlive it briefly while the workspace is removed.
        let output = match tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(
                    render_id = %request.id,
                    timeout_secs = self.settings.timeout.as_secs(),
                    "Engine timed out"
                );
                return Err(RenderError::Timeout {
                    seconds: self.settings.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::error!(
                render_id = %request.id,
                status = ?output.status.code(),
                stdout = %stdout,
                stderr = %stderr,
                "Engine execution failed"
            );
            return Err(RenderError::Failed {
                status: output.status.code(),
                stderr: stderr.into_owned(),
            });
        }

        // The engine writes progress to stderr even on success.
        tracing::debug!(render_id = %request.id, stdout = %stdout, stderr = %stderr, "Engine finished");

        let path = find_output(&workspace.media_dir(), &request.scene).await?;
        tracing::info!(render_id = %request.id, path = %path.display(), "Found rendered video");

        Ok(RenderedVideo {
            scene: request.scene.clone(),
            path,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::settings::Quality;
    use scenecast_core::RenderId;
    use std::time::Duration;

    // Stand-in engine. Positional layout: $1=-q<x> $2=--media_dir $3=<media> $4=<script> $5=<scene>
    const FAKE_ENGINE: &str = r#"
media="$3"; script="$4"; scene="$5"
module=$(basename "$script" .py)
mkdir -p "$media/videos/$module/480p15"
cp "$script" "$media/videos/$module/480p15/$scene.mp4"
echo "Rendered $scene" >&2
"#;

    fn engine(dir: &Path, body: &str) -> RenderSettings {
        let path = dir.join("engine.sh");
        std::fs::write(&path, body).unwrap();
        // Run through `sh` so the test never execs a file it just wrote.
        RenderSettings::default()
            .with_program("sh")
            .with_program_args(vec![path.to_string_lossy().into_owned()])
    }

    fn request(script: &str) -> RenderRequest {
        RenderRequest::from_script(RenderId::new(), script).unwrap()
    }

    const SCRIPT: &str = "from manim import *\nclass ConceptScene(Scene):\n    def construct(self):\n        pass\n";

    #[tokio::test]
    async fn test_command_line_shape() {
        let ws = RenderWorkspace::create(RenderId::new(), None).await.unwrap();
        let renderer = ManimRenderer::new(
            RenderSettings::default()
                .with_quality(Quality::High)
                .with_extra_args(vec!["--disable_caching".to_string()]),
        );
        let script = ws.script_path();
        let cmd = renderer.command(&ws, &script, "ConceptScene");
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "manim");
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-qh".to_string(),
                "--media_dir".to_string(),
                ws.media_dir().to_string_lossy().into_owned(),
                "--disable_caching".to_string(),
                script.to_string_lossy().into_owned(),
                "ConceptScene".to_string(),
            ]
        );
        assert_eq!(std_cmd.get_current_dir(), Some(ws.path()));
    }

    #[tokio::test]
    async fn test_render_success() {
        let tools = tempfile::tempdir().unwrap();
        let renderer = ManimRenderer::new(engine(tools.path(), FAKE_ENGINE));
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, Some(tools.path())).await.unwrap();

        let video = renderer.render(&req, &ws).await.unwrap();
        assert_eq!(video.scene, "ConceptScene");
        assert!(video.path.starts_with(ws.media_dir()));
        assert_eq!(video.read_bytes().await.unwrap(), SCRIPT.as_bytes());
    }

    #[tokio::test]
    async fn test_render_failure_carries_stderr() {
        let tools = tempfile::tempdir().unwrap();
        let renderer = ManimRenderer::new(engine(tools.path(), "echo 'NameError: Circl' >&2\nexit 3\n"));
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, None).await.unwrap();

        match renderer.render(&req, &ws).await {
            Err(RenderError::Failed { status, stderr }) => {
                assert_eq!(status, Some(3));
                assert!(stderr.contains("NameError"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let tools = tempfile::tempdir().unwrap();
        let settings = engine(tools.path(), "sleep 5\n").with_timeout(Duration::from_millis(200));
        let renderer = ManimRenderer::new(settings);
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, None).await.unwrap();

        let started = std::time::Instant::now();
        let err = renderer.render(&req, &ws).await.unwrap_err();
        assert!(matches!(err, RenderError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_timeout_kills_engine() {
        let tools = tempfile::tempdir().unwrap();
        let marker = tools.path().join("finished");
        let body = format!("sleep 1\ntouch '{}'\n", marker.display());
        let settings = engine(tools.path(), &body).with_timeout(Duration::from_millis(100));
        let renderer = ManimRenderer::new(settings);
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, None).await.unwrap();

        let err = renderer.render(&req, &ws).await.unwrap_err();
        assert!(matches!(err, RenderError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_render_without_output() {
        let tools = tempfile::tempdir().unwrap();
        let renderer = ManimRenderer::new(engine(tools.path(), "exit 0\n"));
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, None).await.unwrap();

        let err = renderer.render(&req, &ws).await.unwrap_err();
        assert_eq!(
            err,
            RenderError::OutputMissing {
                scene: "ConceptScene".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_render_spawn_failure() {
        let renderer = ManimRenderer::new(
            RenderSettings::default().with_program("/nonexistent/scenecast-engine"),
        );
        let req = request(SCRIPT);
        let ws = RenderWorkspace::create(req.id, None).await.unwrap();

        let err = renderer.render(&req, &ws).await.unwrap_err();
        assert!(matches!(err, RenderError::Spawn { ref program, .. } if program == "/nonexistent/scenecast-engine"));
    }
}
