//! SCENECAST Server
//!
//! Render worker: turns posted animation scripts into hosted videos.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::{Context, Result};
use clap::Parser;
use scenecast_render::{ManimRenderer, Renderer};
use scenecast_server::config::BlobBackend;
use scenecast_server::{ApiServer, ConfigOverrides, LogFormat, ServerConfig, init_logging};
use scenecast_storage::{BlobStore, HttpBlobStore, HttpStoreConfig, MemoryBlobStore};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "scenecast-server")]
#[command(about = "SCENECAST render worker", long_about = None)]
struct Args {
    /// Bind address, overrides HOST and PORT
    #[arg(short, long)]
    bind: Option<String>,

    /// Log format (json or pretty), overrides LOG_FORMAT
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Blob backend (http or memory), overrides BLOB_BACKEND
    #[arg(long)]
    blob_backend: Option<BlobBackend>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        bind: args.bind,
        log_format: args.log_format,
        blob_backend: args.blob_backend,
    };
    let mut config = ServerConfig::from_env_with(&overrides).context("invalid configuration")?;
    init_logging(config.log_format);

    let store: Arc<dyn BlobStore> = match config.blob.backend {
        BlobBackend::Http => {
            let token = config
                .blob
                .token
                .take()
                .context("BLOB_READ_WRITE_TOKEN is required")?;
            let store_config = HttpStoreConfig::new(token).with_api_url(config.blob.api_url.clone());
            Arc::new(HttpBlobStore::new(store_config).context("failed to set up blob store client")?)
        }
        BlobBackend::Memory => {
            tracing::warn!("Using in-memory blob store, videos are not reachable from outside");
            Arc::new(MemoryBlobStore::new())
        }
    };

    let renderer = ManimRenderer::new(config.render.clone());
    tracing::info!(
        renderer = renderer.name(),
        program = %renderer.settings().program,
        quality = ?renderer.settings().quality,
        timeout_secs = renderer.settings().timeout.as_secs(),
        "Configured renderer"
    );

    let server = ApiServer::new(config, Arc::new(renderer), store);
    server.serve().await?;

    Ok(())
}
