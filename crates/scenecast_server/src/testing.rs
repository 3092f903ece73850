//! Test doubles shared by the router tests.

use crate::api::ApiServer;
use crate::config::ServerConfig;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use scenecast_core::BlobPathname;
use scenecast_render::{RenderError, RenderRequest, RenderWorkspace, RenderedVideo, Renderer, find_output};
use scenecast_storage::{Blob, BlobStore, MemoryBlobStore, StoreError, StoredBlob};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const TOKEN: &str = "test-worker-token";

pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42fake-video";

pub const HELLO_SCENE: &str = "from manim import *\n\nclass ConceptScene(Scene):\n    def construct(self):\n        self.play(Write(Text(\"Hello\")))\n";

/// What the fake engine does
pub enum Outcome {
    Video,
    NoOutput,
    Fail(fn() -> RenderError),
}

/// Renderer that writes a canned file where the real engine would
pub struct FakeRenderer {
    outcome: Outcome,
    seen: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeRenderer {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Scene and workspace path of every call
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    fn name(&self) -> &str {
        "fake"
    }

    async fn render(
        &self,
        request: &RenderRequest,
        workspace: &RenderWorkspace,
    ) -> Result<RenderedVideo, RenderError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.scene.clone(), workspace.path().to_path_buf()));
        workspace.write_script(&request.script).await?;

        match &self.outcome {
            Outcome::Video => {
                let dir = workspace
                    .media_dir()
                    .join("videos")
                    .join(request.id.script_file_name().trim_end_matches(".py"))
                    .join("480p15");
                tokio::fs::create_dir_all(&dir).await?;
                tokio::fs::write(dir.join(format!("{}.mp4", request.scene)), VIDEO_BYTES).await?;
            }
            Outcome::NoOutput => {}
            Outcome::Fail(make) => return Err(make()),
        }

        let path = find_output(&workspace.media_dir(), &request.scene).await?;
        Ok(RenderedVideo {
            scene: request.scene.clone(),
            path,
        })
    }
}

/// Store that refuses every upload
pub struct RejectingStore;

#[async_trait]
impl BlobStore for RejectingStore {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn put(&self, _pathname: &BlobPathname, _blob: Blob) -> Result<StoredBlob, StoreError> {
        Err(StoreError::Rejected {
            status: 403,
            message: "Access denied, please provide a valid token for this resource.".to_string(),
        })
    }
}

/// A wired worker plus handles on its doubles
pub struct TestWorker {
    pub renderer: Arc<FakeRenderer>,
    pub store: Arc<MemoryBlobStore>,
    pub work_dir: TempDir,
    server: ApiServer,
}

impl TestWorker {
    pub fn config() -> ServerConfig {
        ServerConfig::new(SecretString::from(TOKEN.to_string()))
    }

    pub fn succeeding() -> Self {
        Self::with_outcome(Outcome::Video)
    }

    pub fn with_outcome(outcome: Outcome) -> Self {
        Self::build(outcome, None, Self::config())
    }

    pub fn with_store(store: Arc<dyn BlobStore>) -> Self {
        Self::build(Outcome::Video, Some(store), Self::config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::build(Outcome::Video, None, config)
    }

    fn build(outcome: Outcome, store: Option<Arc<dyn BlobStore>>, mut config: ServerConfig) -> Self {
        let work_dir = TempDir::new().unwrap();
        config.work_dir = Some(work_dir.path().to_path_buf());

        let renderer = Arc::new(FakeRenderer::new(outcome));
        let memory = Arc::new(MemoryBlobStore::with_base_url("https://blob.test/"));
        let store = store.unwrap_or_else(|| Arc::clone(&memory) as Arc<dyn BlobStore>);
        let server = ApiServer::new(config, Arc::clone(&renderer) as Arc<dyn Renderer>, store);

        Self {
            renderer,
            store: memory,
            work_dir,
            server,
        }
    }

    pub fn router(&self) -> Router {
        self.server.router()
    }

    /// Entries left in the workspace root
    pub fn leftovers(&self) -> usize {
        std::fs::read_dir(self.work_dir.path()).unwrap().count()
    }
}

pub fn render_request(token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/render")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(body.into()).unwrap()
}

pub fn code_body(code: &str) -> String {
    serde_json::json!({ "code": code }).to_string()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
