//! The `/render` pipeline.
//!
//! Parse body, find the scene, render into a fresh workspace, upload,
//! answer with the URL. The workspace is dropped before the response
//! leaves, whatever the outcome.

use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use crate::observability::render_span;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use scenecast_core::{BlobPathname, RenderId};
use scenecast_render::{RenderRequest, RenderWorkspace};
use scenecast_storage::Blob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Successful render response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResponse {
    /// Public URL of the uploaded video
    #[serde(rename = "videoUrl")]
    pub video_url: String,
}

/// `POST /render`
///
/// # Errors
///
/// Returns 400 for unusable input and 500 when rendering or upload fails
pub async fn render_video(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<RenderResponse>> {
    let code = extract_code(&body)?;
    let request = RenderRequest::from_script(RenderId::new(), code)
        .ok_or_else(|| ApiError::bad_request("No Scene class found in the code"))?;

    let span = render_span(&request.id.to_string(), &request.scene);
    let started = Instant::now();
    let result = run_pipeline(&state, &request).instrument(span.clone()).await;

    span.in_scope(|| match &result {
        Ok(response) => tracing::info!(
            url = %response.video_url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Render completed"
        ),
        Err(err) => tracing::error!(
            error = err.message(),
            details = err.details().unwrap_or_default(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Render failed"
        ),
    });

    result.map(Json)
}

/// Pull a non-empty `code` string out of the JSON body
fn extract_code(body: &[u8]) -> ApiResult<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON body"))?;

    value
        .get("code")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("No code provided"))
}

async fn run_pipeline(state: &AppState, request: &RenderRequest) -> ApiResult<RenderResponse> {
    tracing::info!(renderer = state.renderer.name(), "Found Scene class");

    let workspace = RenderWorkspace::create(request.id, state.work_dir.as_deref())
        .await
        .map_err(|e| ApiError::internal("Render workspace error").with_details(e.to_string()))?;

    let video = state.renderer.render(request, &workspace).await?;
    let data = video.read_bytes().await?;
    tracing::debug!(path = %video.path.display(), size = data.len(), "Rendered video");

    let pathname = BlobPathname::new_video();
    let stored = state.store.put(&pathname, Blob::video(data)).await?;
    tracing::info!(
        store = state.store.name(),
        pathname = %stored.pathname,
        size = stored.size,
        "Uploaded video"
    );

    Ok(RenderResponse {
        video_url: stored.url,
    })
}
