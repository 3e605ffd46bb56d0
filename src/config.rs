//! Configuration management.
//!
//! Supports command-line arguments via clap, environment variables with the
//! `FACEMARK_` prefix, and sensible defaults for all optional settings.
//!
//! # Environment Variables
//!
//! - `FACEMARK_HOST` - Server bind address (default: 0.0.0.0)
//! - `FACEMARK_PORT` - Server port (default: 8000)
//! - `FACEMARK_DATABASE_URL` - Database URL (default: sqlite://facemark.db?mode=rwc)
//! - `FACEMARK_AUTH_TOKEN` - Shared secret for the token guard (generated if unset)
//! - `FACEMARK_LANDMARK_MODEL` - Path to the landmark ONNX model (required)
//! - `FACEMARK_CACHE_CAPACITY` - Max cached mutating-call results (default: 100)
//! - `FACEMARK_CACHE_TTL` - Cache time-to-live in seconds (default: 300)

use clap::Parser;

use crate::store::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default database URL (file-backed SQLite, created on first use).
pub const DEFAULT_DATABASE_URL: &str = "sqlite://facemark.db?mode=rwc";

// =============================================================================
// CLI Arguments
// =============================================================================

/// facemark - a user directory service with facial landmark annotation.
#[derive(Parser, Debug, Clone)]
#[command(name = "facemark")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "FACEMARK_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FACEMARK_PORT")]
    pub port: u16,

    // =========================================================================
    // Store Configuration
    // =========================================================================
    /// Database URL for the user store.
    #[arg(long, default_value = DEFAULT_DATABASE_URL, env = "FACEMARK_DATABASE_URL")]
    pub database_url: String,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Shared secret required in the `token` header on user routes.
    ///
    /// If not provided, a random secret is generated at startup and logged
    /// once; restarting invalidates previously distributed tokens.
    #[arg(long, env = "FACEMARK_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    // =========================================================================
    // Annotation Configuration
    // =========================================================================
    /// Path to the facial landmark ONNX model.
    #[arg(long, env = "FACEMARK_LANDMARK_MODEL")]
    pub landmark_model: String,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum number of cached mutating-call results.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "FACEMARK_CACHE_CAPACITY")]
    pub cache_capacity: u64,

    /// Time-to-live for cached results, in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, env = "FACEMARK_CACHE_TTL")]
    pub cache_ttl: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated). Allows any origin if unset.
    #[arg(long, env = "FACEMARK_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err(
                "Database URL is required. Set --database-url or FACEMARK_DATABASE_URL"
                    .to_string(),
            );
        }

        if self.landmark_model.is_empty() {
            return Err(
                "Landmark model path is required. Set --landmark-model or FACEMARK_LANDMARK_MODEL"
                    .to_string(),
            );
        }

        if let Some(token) = &self.auth_token {
            if token.is_empty() {
                return Err("auth_token must not be empty when provided".to_string());
            }
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than 0".to_string());
        }
        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
