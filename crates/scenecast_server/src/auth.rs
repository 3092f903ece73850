//! Bearer token authentication.
//!
//! Callers present `Authorization: Bearer <token>` with the shared worker
//! token. Anything else is rejected before the request body is read.

use crate::api::AppState;
use crate::error::ApiError;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;

/// Authentication failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Authorization header required")]
    MissingHeader,
    /// Header is not `Bearer <token>`
    #[error("Malformed Authorization header")]
    Malformed,
    /// Token does not match
    #[error("Invalid bearer token")]
    InvalidToken,
}

/// Checks bearer tokens against the configured worker token
#[derive(Debug)]
pub struct Authenticator {
    token: SecretString,
}

impl Authenticator {
    /// Create an authenticator for `token`
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Verify the `Authorization` header of a request
    ///
    /// # Errors
    ///
    /// Returns the reason the request is not authorized
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
        let value = value.to_str().map_err(|_| AuthError::Malformed)?;
        let (scheme, presented) = value.trim().split_once(' ').ok_or(AuthError::Malformed)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::Malformed);
        }
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::Malformed);
        }

        if constant_time_eq(presented.as_bytes(), self.token.expose_secret().as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

// Length leaks; content does not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware rejecting unauthenticated requests with 401
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(err) = state.auth.verify(request.headers()) {
        tracing::warn!(reason = %err, path = %request.uri().path(), "Rejected request");
        return Err(ApiError::unauthorized());
    }
    Ok(next.run(request).await)
}
