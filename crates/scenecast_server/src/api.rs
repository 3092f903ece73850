//! API server

use crate::auth::{self, Authenticator};
use crate::config::{SERVICE_NAME, ServerConfig};
use crate::handler;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use scenecast_core::{CoreError, CoreResult};
use scenecast_render::Renderer;
use scenecast_storage::BlobStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared request state
pub struct AppState {
    /// Bearer token check
    pub auth: Authenticator,
    /// Engine
    pub renderer: Arc<dyn Renderer>,
    /// Upload target
    pub store: Arc<dyn BlobStore>,
    /// Root for render workspaces
    pub work_dir: Option<PathBuf>,
}

/// Health check response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    /// Service name
    pub service: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// The render worker HTTP server
pub struct ApiServer {
    bind: String,
    max_script_bytes: usize,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Wire a server from configuration and its two backends
    #[must_use]
    pub fn new(
        config: ServerConfig,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        let bind = config.bind_addr();
        Self {
            bind,
            max_script_bytes: config.max_script_bytes,
            state: Arc::new(AppState {
                auth: Authenticator::new(config.auth_token),
                renderer,
                store,
                work_dir: config.work_dir,
            }),
        }
    }

    /// Address the server binds to
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let render = Router::new()
            .route("/render", post(handler::render_video))
            .route_layer(middleware::from_fn_with_state(
                Arc::clone(&self.state),
                auth::require_bearer,
            ))
            .layer(DefaultBodyLimit::max(self.max_script_bytes));

        Router::new()
            .route("/", get(health))
            .route("/health", get(health))
            .merge(render)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Bind and serve until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails
    pub async fn serve(self) -> CoreResult<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&self.bind)
            .await
            .map_err(|e| CoreError::Internal {
                message: format!("failed to bind to {}: {e}", self.bind),
            })?;

        tracing::info!(
            bind = %self.bind,
            renderer = self.state.renderer.name(),
            store = self.state.store.name(),
            "Starting render worker"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CoreError::Internal {
                message: format!("server error: {e}"),
            })?;

        tracing::info!("Render worker stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
