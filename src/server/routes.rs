//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! /health              - Health check (public)
//! /process-image       - Image annotation (public)
//! /users               - Create / search users (token required)
//! /users/{id}          - Read / rename / delete a user (token required)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use facemark::annotate::{Annotator, OnnxLandmarkDetector};
//! use facemark::server::{create_router, RouterConfig};
//! use facemark::store;
//!
//! let db = store::connect("sqlite://facemark.db?mode=rwc").await?;
//! let detector = OnnxLandmarkDetector::load("models/face_mesh.onnx")?;
//!
//! let config = RouterConfig::new("my-secret-token");
//! let router = create_router(db, Annotator::new(detector), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderName, CONTENT_TYPE};
use http::Method;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, TokenAuth, TOKEN_HEADER};
use super::handlers::{
    create_user_handler, delete_user_handler, health_handler, process_image_handler,
    read_user_handler, search_users_handler, update_user_handler, AppState,
};
use crate::annotate::{Annotator, LandmarkDetector};
use crate::store::cache::{UserOpCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret the `token` header must equal on protected routes
    pub auth_token: String,

    /// Maximum number of cached mutating-call results
    pub cache_capacity: u64,

    /// Time-to-live for cached mutating-call results
    pub cache_ttl: Duration,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given auth token.
    ///
    /// By default:
    /// - Cache policy is 100 entries with a 5 minute TTL
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set the response cache capacity and time-to-live.
    pub fn with_cache_policy(mut self, capacity: u64, ttl: Duration) -> Self {
        self.cache_capacity = capacity;
        self.cache_ttl = ttl;
        self
    }

    /// Set specific allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// User routes are guarded by the token middleware; the image annotation and
/// health routes are public. The guard runs before any store access.
pub fn create_router<D: LandmarkDetector + 'static>(
    db: DatabaseConnection,
    annotator: Annotator<D>,
    config: RouterConfig,
) -> Router {
    let user_cache = UserOpCache::with_policy(config.cache_capacity, config.cache_ttl);
    let state = AppState::new(db, user_cache, annotator);

    let auth = TokenAuth::new(&config.auth_token);
    let cors = build_cors_layer(&config);

    let guarded_routes = Router::new()
        .route(
            "/users",
            post(create_user_handler::<D>).get(search_users_handler::<D>),
        )
        .route(
            "/users/{id}",
            get(read_user_handler::<D>)
                .put(update_user_handler::<D>)
                .delete(delete_user_handler::<D>),
        )
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/process-image", post(process_image_handler::<D>))
        .route("/health", get(health_handler))
        .with_state(state);

    let router = Router::new()
        .merge(guarded_routes)
        .merge(public_routes)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
