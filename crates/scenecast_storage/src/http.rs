//! HTTP blob store client.
//!
//! Speaks the Vercel Blob upload protocol: one `PUT {api}/{pathname}` with the
//! raw bytes as body and the options in `x-*` headers, answered by a JSON
//! document carrying the public `url`.

use crate::blob::Blob;
use crate::store::{BlobStore, StoreError, StoredBlob};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use scenecast_core::BlobPathname;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Public Vercel Blob API endpoint
pub const DEFAULT_API_URL: &str = "https://blob.vercel-storage.com";

/// Protocol version sent with every request
const API_VERSION: &str = "7";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP store configuration
#[derive(Debug)]
pub struct HttpStoreConfig {
    /// API base URL
    pub api_url: String,
    /// Read/write token
    pub token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
    /// Let the service append a random suffix to pathnames
    pub add_random_suffix: bool,
    /// `Cache-Control` max-age the service should serve the blob with
    pub cache_control_max_age: Option<u64>,
}

impl HttpStoreConfig {
    /// Configuration for the public endpoint with the given token
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            add_random_suffix: false,
            cache_control_max_age: None,
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutResponse {
    url: Option<String>,
    pathname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

/// Blob store backed by the hosted blob HTTP API
pub struct HttpBlobStore {
    config: HttpStoreConfig,
    client: reqwest::Client,
}

impl HttpBlobStore {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Client`] if the HTTP client cannot be built
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    fn put_url(&self, pathname: &BlobPathname) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            pathname.as_str().trim_start_matches('/')
        )
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn put(&self, pathname: &BlobPathname, blob: Blob) -> Result<StoredBlob, StoreError> {
        let size = blob.size();
        tracing::info!(
            pathname = %pathname,
            size,
            address = %blob.address(),
            "Uploading blob"
        );

        let mut request = self
            .client
            .put(self.put_url(pathname))
            .bearer_auth(self.config.token.expose_secret())
            .header("x-api-version", API_VERSION)
            .header("access", "public")
            .header("x-content-type", blob.content_type())
            .header(CONTENT_TYPE, blob.content_type())
            .header(
                "x-add-random-suffix",
                if self.config.add_random_suffix { "1" } else { "0" },
            );
        if let Some(max_age) = self.config.cache_control_max_age {
            request = request.header("x-cache-control-max-age", max_age.to_string());
        }

        let response = request
            .body(blob.data())
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| StoreError::Transport {
            reason: format!("failed reading response body: {e}"),
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error.message.or(env.error.code))
                .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());
            tracing::error!(status = status.as_u16(), message = %message, "Blob upload rejected");
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PutResponse =
            serde_json::from_slice(&body).map_err(|e| StoreError::InvalidResponse {
                reason: e.to_string(),
            })?;
        let url = parsed.url.ok_or_else(|| StoreError::InvalidResponse {
            reason: "missing url".to_string(),
        })?;

        Ok(StoredBlob {
            url,
            pathname: parsed
                .pathname
                .unwrap_or_else(|| pathname.as_str().to_string()),
            size,
        })
    }
}
