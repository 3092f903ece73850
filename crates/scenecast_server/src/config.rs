//! Server configuration.
//!
//! Loaded from environment variables. Empty values count as unset.

use crate::observability::LogFormat;
use scenecast_render::{Quality, RenderSettings};
use scenecast_storage::DEFAULT_API_URL;
use secrecy::SecretString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Default cap on request bodies
pub const DEFAULT_MAX_SCRIPT_BYTES: usize = 1024 * 1024;

/// Service name reported by the health routes
pub const SERVICE_NAME: &str = "manim-worker";

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} is required")]
    Missing(&'static str),
    /// A variable could not be parsed
    #[error("{key}={value} is invalid: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },
}

/// Where rendered videos are uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobBackend {
    /// Hosted blob HTTP API
    #[default]
    Http,
    /// Process memory, for local development
    Memory,
}

impl BlobBackend {
    /// Name accepted by `BLOB_BACKEND`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "vercel" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown blob backend: {other}")),
        }
    }
}

/// Blob store settings
#[derive(Debug)]
pub struct BlobConfig {
    /// Backend selection
    pub backend: BlobBackend,
    /// API token, required for the HTTP backend
    pub token: Option<SecretString>,
    /// API base URL
    pub api_url: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::default(),
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Command-line values that take precedence over the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `host:port` replacing `HOST` and `PORT`
    pub bind: Option<String>,
    /// Replaces `LOG_FORMAT`
    pub log_format: Option<LogFormat>,
    /// Replaces `BLOB_BACKEND`
    pub blob_backend: Option<BlobBackend>,
}

/// Configuration for the render worker
#[derive(Debug)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Bearer token callers must present
    pub auth_token: SecretString,
    /// Upload target
    pub blob: BlobConfig,
    /// Engine invocation
    pub render: RenderSettings,
    /// Root for render workspaces (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
    /// Largest accepted request body
    pub max_script_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Minimal configuration around an auth token
    #[must_use]
    pub fn new(auth_token: SecretString) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            auth_token,
            blob: BlobConfig::default(),
            render: RenderSettings::default(),
            work_dir: None,
            max_script_bytes: DEFAULT_MAX_SCRIPT_BYTES,
            log_format: LogFormat::Json,
        }
    }

    /// `host:port` to bind
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from the process environment, then apply `overrides`
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_env_with(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration from `lookup`, then apply `overrides`.
    ///
    /// The backend override is applied before validation, so `memory`
    /// lifts the `BLOB_READ_WRITE_TOKEN` requirement.
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_lookup_with<F>(lookup: F, overrides: &ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match overrides.blob_backend {
            Some(backend) => Self::from_lookup(|key| match key {
                "BLOB_BACKEND" => Some(backend.as_str().to_string()),
                _ => lookup(key),
            })?,
            None => Self::from_lookup(lookup)?,
        };

        if let Some(format) = overrides.log_format {
            config.log_format = format;
        }
        if let Some(bind) = &overrides.bind {
            let (host, port) = parse_bind(bind)?;
            config.host = host;
            config.port = port;
        }
        Ok(config)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth_token = get("WORKER_AUTH_TOKEN")
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("WORKER_AUTH_TOKEN"))?;
        let mut config = Self::new(auth_token);

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var::<u16, _>(&get, "PORT")? {
            config.port = port;
        }

        if let Some(backend) = get("BLOB_BACKEND") {
            config.blob.backend = backend.parse::<BlobBackend>().map_err(|reason| ConfigError::Invalid {
                key: "BLOB_BACKEND",
                value: backend.clone(),
                reason,
            })?;
        }
        config.blob.token = get("BLOB_READ_WRITE_TOKEN").map(SecretString::from);
        if config.blob.backend == BlobBackend::Http && config.blob.token.is_none() {
            return Err(ConfigError::Missing("BLOB_READ_WRITE_TOKEN"));
        }
        if let Some(url) = get("BLOB_API_URL") {
            config.blob.api_url = url;
        }

        if let Some(program) = get("MANIM_BIN") {
            config.render.program = program;
        }
        if let Some(quality) = get("MANIM_QUALITY") {
            config.render.quality =
                Quality::from_str(&quality).map_err(|e| ConfigError::Invalid {
                    key: "MANIM_QUALITY",
                    value: quality.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(secs) = parse_var::<u64, _>(&get, "RENDER_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "RENDER_TIMEOUT_SECS",
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            config.render.timeout = Duration::from_secs(secs);
        }
        if let Some(args) = get("MANIM_EXTRA_ARGS") {
            config.render.extra_args = args.split_whitespace().map(str::to_string).collect();
        }

        config.work_dir = get("RENDER_WORK_DIR").map(PathBuf::from);
        if let Some(limit) = parse_var::<usize, _>(&get, "MAX_SCRIPT_BYTES")? {
            config.max_script_bytes = limit;
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.log_format = format.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                key: "LOG_FORMAT",
                value: format.clone(),
                reason,
            })?;
        }

        Ok(config)
    }
}

fn parse_bind(bind: &str) -> Result<(String, u16), ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "--bind",
        value: bind.to_string(),
        reason: reason.to_string(),
    };
    let (host, port) = bind
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected host:port"))?;
    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| invalid(&format!("invalid port: {e}")))?;
    Ok((host.to_string(), port))
}

fn parse_var<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
