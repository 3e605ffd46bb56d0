//! # facemark
//!
//! A small HTTP service exposing CRUD endpoints for a user record backed by a
//! relational table, plus an endpoint that runs a facial-landmark detector
//! over an uploaded image and overlays the detected points.
//!
//! ## Features
//!
//! - **User store**: create/read/search/update/delete over a single table,
//!   persisted through sea-orm
//! - **Response cache**: bounded, time-expiring cache over the mutating
//!   store operations
//! - **Token guard**: protected routes require a shared secret in the
//!   `token` header, compared in constant time
//! - **Image annotation**: uploaded images run through a pretrained ONNX
//!   landmark model; detected points are drawn and the result returned as
//!   base64 PNG in a JSON envelope
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`store`] - sea-orm entity, store operations, and the response cache
//! - [`annotate`] - landmark detector seam and the overlay pipeline
//! - [`server`] - Axum-based HTTP server, routes, and the token guard
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use facemark::annotate::{Annotator, OnnxLandmarkDetector};
//! use facemark::server::{create_router, RouterConfig};
//! use facemark::store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = store::connect("sqlite://facemark.db?mode=rwc").await?;
//!     store::init_schema(&db).await?;
//!
//!     let detector = OnnxLandmarkDetector::load("models/face_mesh.onnx")?;
//!     let router = create_router(
//!         db,
//!         Annotator::new(detector),
//!         RouterConfig::new("my-secret-token"),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use annotate::{Annotator, DetectorError, Landmark, LandmarkDetector, OnnxLandmarkDetector};
pub use config::Config;
pub use error::{AnnotateError, StoreError};
pub use server::{
    auth_middleware, create_router, AppState, AuthError, ErrorResponse, HealthResponse,
    ProcessImageResponse, RouterConfig, TokenAuth, UserResponse, UsersResponse, TOKEN_HEADER,
};
pub use store::{UserOpCache, UserOpKey, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
