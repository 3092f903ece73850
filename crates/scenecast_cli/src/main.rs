//! SCENECAST CLI
//!
//! Client-side tools for the render worker: an end-to-end smoke test and a
//! local script preflight.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "scenecast")]
#[command(version)]
#[command(about = "SCENECAST - render worker client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a scene to a running worker and report the result
    Smoke {
        /// Render endpoint
        #[arg(short, long, default_value = "http://localhost:8080/render")]
        url: String,
        /// Worker bearer token
        #[arg(short, long, env = "WORKER_AUTH_TOKEN", hide_env_values = true)]
        token: String,
        /// Script to submit (built-in hello scene when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Request timeout in seconds
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
    /// Check a script locally before submitting it
    Check {
        /// Script to check
        #[arg(short, long)]
        file: PathBuf,
        /// Strip markdown code fences first
        #[arg(long)]
        strip_fences: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Smoke {
            url,
            token,
            file,
            timeout,
        } => commands::smoke(&url, &token, file.as_deref(), timeout).await,
        Commands::Check { file, strip_fences } => commands::check(&file, strip_fences),
    }
}
