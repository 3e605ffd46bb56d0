//! Shared-secret authentication.
//!
//! Protected routes require a `token` header equal to a single secret fixed
//! at process start. The secret is injected configuration; when none is
//! supplied, one is generated at startup (16 random bytes, hex-encoded) and
//! logged once so it can be distributed. Restarting the process invalidates
//! previously distributed tokens.
//!
//! # Security Properties
//!
//! - **Constant-time comparison**: token verification uses constant-time
//!   comparison to prevent timing attacks
//! - No rate limiting, per-user scoping, or rotation: one secret guards
//!   everything for the process lifetime

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::handlers::ErrorResponse;

/// Name of the request header carrying the caller's token.
pub const TOKEN_HEADER: &str = "token";

/// Byte length of a generated secret before hex encoding.
const GENERATED_SECRET_LEN: usize = 16;

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// The `token` header is absent
    MissingToken,

    /// The supplied token does not match the server secret
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing token header"),
            AuthError::InvalidToken => write!(f, "Unauthorized"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_type, message) = match &self {
            AuthError::MissingToken => ("missing_token", self.to_string()),
            AuthError::InvalidToken => ("invalid_token", self.to_string()),
        };

        // An invalid token could indicate probing, so log at warn level;
        // a missing header is common and expected, log at debug.
        match &self {
            AuthError::InvalidToken => {
                warn!(error_type = error_type, "Authentication failed: {}", message);
            }
            AuthError::MissingToken => {
                debug!(error_type = error_type, "Authentication failed: {}", message);
            }
        }

        let error_response =
            ErrorResponse::with_status(error_type, message, StatusCode::UNAUTHORIZED);
        (StatusCode::UNAUTHORIZED, Json(error_response)).into_response()
    }
}

// =============================================================================
// Token Authentication
// =============================================================================

/// Shared-secret authenticator.
///
/// Holds the process-lifetime secret and verifies caller-supplied tokens
/// against it in constant time.
#[derive(Clone)]
pub struct TokenAuth {
    secret: String,
}

impl TokenAuth {
    /// Create an authenticator with an explicitly injected secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generate an authenticator with a fresh random secret.
    pub fn generate() -> Self {
        let mut raw = [0u8; GENERATED_SECRET_LEN];
        OsRng.fill_bytes(&mut raw);
        Self {
            secret: hex::encode(raw),
        }
    }

    /// The secret token callers must present.
    pub fn token(&self) -> &str {
        &self.secret
    }

    /// Verify a caller-supplied token.
    pub fn verify(&self, supplied: &str) -> Result<(), AuthError> {
        if supplied.as_bytes().ct_eq(self.secret.as_bytes()).into() {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware verifying the `token` header.
///
/// Rejects the request with 401 before it reaches any handler, so no store
/// access occurs for unauthorized callers.
pub async fn auth_middleware(
    State(auth): State<TokenAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let supplied = request
        .headers()
        .get(TOKEN_HEADER)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth.verify(supplied)?;

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
