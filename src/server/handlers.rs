//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `POST /users` - create a user
//! - `GET /users` - search users by name substring
//! - `GET /users/{id}` - fetch a user
//! - `PUT /users/{id}` - rename a user
//! - `DELETE /users/{id}` - delete a user
//! - `POST /process-image` - annotate an uploaded image with facial landmarks
//! - `GET /health` - health check

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::annotate::{Annotator, LandmarkDetector};
use crate::error::{AnnotateError, StoreError};
use crate::store::{users, UserOpCache};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to all handlers via Axum's State
/// extractor.
pub struct AppState<D: LandmarkDetector> {
    /// Connection pool to the user store; a connection is checked out per
    /// operation and returned on every exit path
    pub db: DatabaseConnection,

    /// Cache fronting the mutating store operations
    pub user_cache: Arc<UserOpCache>,

    /// The image annotation service
    pub annotator: Arc<Annotator<D>>,
}

impl<D: LandmarkDetector> AppState<D> {
    /// Create application state over a database handle and an annotator.
    pub fn new(db: DatabaseConnection, user_cache: UserOpCache, annotator: Annotator<D>) -> Self {
        Self {
            db,
            user_cache: Arc::new(user_cache),
            annotator: Arc::new(annotator),
        }
    }
}

impl<D: LandmarkDetector> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            user_cache: Arc::clone(&self.user_cache),
            annotator: Arc::clone(&self.annotator),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name for the new user
    pub name: String,
}

/// Body for `PUT /users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// Replacement display name
    pub name: String,
}

/// Query parameters for `GET /users`.
#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    /// Case-insensitive substring to match against names; absent means the
    /// empty substring, which matches every user
    #[serde(default)]
    pub search: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_token")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// A user as returned on the wire.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// Response from the user search endpoint.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

/// Response from the image annotation endpoint.
#[derive(Debug, Serialize)]
pub struct ProcessImageResponse {
    /// The annotated image, PNG-encoded and then base64-encoded
    pub processed_image: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors from the user endpoints, mapped to HTTP exactly once here.
#[derive(Debug)]
pub enum UserError {
    /// No row for the given identifier
    NotFound { id: i32 },

    /// The store itself failed
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        UserError::Store(err)
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            UserError::NotFound { id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("User not found: {}", id),
            ),
            UserError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                err.to_string(),
            ),
        };

        // 404s are common and expected, log at debug; store failures at error.
        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Errors from the image annotation endpoint.
#[derive(Debug)]
pub enum ProcessImageError {
    /// The multipart upload was malformed (missing or unreadable `file`
    /// field)
    InvalidUpload(String),

    /// The annotation pipeline failed
    Annotate(AnnotateError),
}

impl From<AnnotateError> for ProcessImageError {
    fn from(err: AnnotateError) -> Self {
        ProcessImageError::Annotate(err)
    }
}

impl IntoResponse for ProcessImageError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ProcessImageError::InvalidUpload(message) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                message.clone(),
            ),
            ProcessImageError::Annotate(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "processing_error",
                format!("Error processing image: {}", err),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// User Handlers
// =============================================================================

/// Handle `POST /users`: create a user and return 201 with its
/// representation. The mutation goes through the response cache.
pub async fn create_user_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), UserError> {
    let user = state.user_cache.create(&state.db, &body.name).await?;

    debug!(id = user.id, name = %user.name, "created user");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Handle `GET /users/{id}`: 200 with the user, or 404.
pub async fn read_user_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, UserError> {
    let user = users::get(&state.db, id)
        .await?
        .ok_or(UserError::NotFound { id })?;

    Ok(Json(user.into()))
}

/// Handle `GET /users?search=q`: all users whose name contains the substring,
/// case-insensitive. Order is store-defined.
pub async fn search_users_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<UsersResponse>, UserError> {
    let query = params.search.as_deref().unwrap_or("");
    let matches = users::search(&state.db, query).await?;

    Ok(Json(UsersResponse {
        users: matches.into_iter().map(Into::into).collect(),
    }))
}

/// Handle `PUT /users/{id}`: rename a user; 200 with the updated
/// representation, or 404. The mutation goes through the response cache.
pub async fn update_user_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, UserError> {
    let user = state
        .user_cache
        .update(&state.db, id, &body.name)
        .await?
        .ok_or(UserError::NotFound { id })?;

    Ok(Json(user.into()))
}

/// Handle `DELETE /users/{id}`: 204 on success, or 404.
///
/// The store returns the removed row's prior state; 204 forbids a response
/// body, so it is only logged. The mutation goes through the response cache.
pub async fn delete_user_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, UserError> {
    let removed = state
        .user_cache
        .delete(&state.db, id)
        .await?
        .ok_or(UserError::NotFound { id })?;

    debug!(id = removed.id, name = %removed.name, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Image Handler
// =============================================================================

/// Handle `POST /process-image`.
///
/// # Request
///
/// Multipart form with a `file` field carrying the image bytes. Common
/// formats (JPEG, PNG, GIF, BMP) are accepted.
///
/// # Response
///
/// - `200 OK`: `{"processed_image": "<base64 PNG>"}` with landmark markers
///   drawn over at most one detected face; no detected face returns the
///   image unannotated
/// - `400 Bad Request`: missing or unreadable `file` field
/// - `500 Internal Server Error`: decode, detection, or encode failure,
///   with the diagnostic message
pub async fn process_image_handler<D: LandmarkDetector>(
    State(state): State<AppState<D>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessImageResponse>, ProcessImageError> {
    let mut file_data: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProcessImageError::InvalidUpload(format!("Failed to read field: {}", e)))?
    {
        if field.name() == Some("file") {
            file_data = Some(field.bytes().await.map_err(|e| {
                ProcessImageError::InvalidUpload(format!("Failed to read file: {}", e))
            })?);
        }
    }

    let file_data = file_data
        .ok_or_else(|| ProcessImageError::InvalidUpload("file field required".to_string()))?;

    let png = state.annotator.annotate(&file_data).await?;

    Ok(Json(ProcessImageResponse {
        processed_image: BASE64.encode(&png),
    }))
}

// =============================================================================
// Health Handler
// =============================================================================

/// Handle `GET /health`: liveness probe, unguarded.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
