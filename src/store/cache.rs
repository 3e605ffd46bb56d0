//! Response cache for mutating user-store operations.
//!
//! Create, update, and delete calls are fronted by a bounded, time-expiring
//! cache: a repeated identical call within the expiry window returns the
//! previously computed result without re-invoking the store.
//!
//! # Cache Key
//!
//! Entries are keyed purely on the business arguments of the call (operation
//! kind plus id/name), never on the connection handle used to execute it.
//!
//! # Bounds
//!
//! The cache holds at most [`DEFAULT_CACHE_CAPACITY`] entries and expires
//! each entry [`DEFAULT_CACHE_TTL_SECS`] seconds after insertion; entries
//! beyond capacity are evicted under pressure.

use std::time::Duration;

use moka::future::Cache;
use sea_orm::DatabaseConnection;

use crate::error::StoreError;
use crate::store::users;

/// Default maximum number of cached results.
pub const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Default time-to-live for cached results, in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for a mutating store call.
///
/// One variant per wrapped operation, carrying exactly the arguments that
/// determine the call's result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserOpKey {
    /// `create(name)`
    Create { name: String },

    /// `update(id, new_name)`
    Update { id: i32, new_name: String },

    /// `delete(id)`
    Delete { id: i32 },
}

// =============================================================================
// Operation Cache
// =============================================================================

/// Bounded TTL cache wrapping the mutating user-store operations.
///
/// Thread-safe; share across handlers via `Arc`. The wrapped value is the
/// operation's result, including the absent case for update/delete.
pub struct UserOpCache {
    cache: Cache<UserOpKey, Option<users::Model>>,
}

impl UserOpCache {
    /// Create a cache with the default policy (100 entries, 5 minute TTL).
    pub fn new() -> Self {
        Self::with_policy(
            DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    /// Create a cache with an explicit capacity and time-to-live.
    pub fn with_policy(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create a user, returning the cached row for a repeated identical call
    /// within the expiry window.
    pub async fn create(
        &self,
        db: &DatabaseConnection,
        name: &str,
    ) -> Result<users::Model, StoreError> {
        let key = UserOpKey::Create {
            name: name.to_owned(),
        };

        if let Some(Some(hit)) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let created = users::create(db, name).await?;
        self.cache.insert(key, Some(created.clone())).await;
        Ok(created)
    }

    /// Rename a user through the cache. The absent result is cached too.
    pub async fn update(
        &self,
        db: &DatabaseConnection,
        id: i32,
        new_name: &str,
    ) -> Result<Option<users::Model>, StoreError> {
        let key = UserOpKey::Update {
            id,
            new_name: new_name.to_owned(),
        };

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let updated = users::update(db, id, new_name).await?;
        self.cache.insert(key, updated.clone()).await;
        Ok(updated)
    }

    /// Delete a user through the cache. The absent result is cached too.
    pub async fn delete(
        &self,
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<users::Model>, StoreError> {
        let key = UserOpKey::Delete { id };

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let removed = users::delete(db, id).await?;
        self.cache.insert(key, removed.clone()).await;
        Ok(removed)
    }

    /// Number of live entries (after flushing pending maintenance).
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for UserOpCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
