//! User persistence layer.
//!
//! This module owns the lifecycle of the single `users` table:
//!
//! - [`users`] - the sea-orm entity and the create/get/search/update/delete
//!   operations over it
//! - [`db`] - connection handling and startup schema creation
//! - [`cache`] - a bounded, time-expiring cache fronting the mutating
//!   operations
//!
//! All operations take a live [`sea_orm::DatabaseConnection`]; each call is
//! committed immediately and is atomic in isolation. There is no cross-call
//! transactional guarantee.

pub mod cache;
pub mod db;
pub mod users;

pub use cache::{UserOpCache, UserOpKey, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
pub use db::{connect, init_schema};
