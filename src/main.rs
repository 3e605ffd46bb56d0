//! facemark - a user directory service with facial landmark annotation.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facemark::{
    annotate::{Annotator, OnnxLandmarkDetector},
    config::Config,
    server::{create_router, RouterConfig, TokenAuth},
    store,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Database: {}", config.database_url);
    info!("  Landmark model: {}", config.landmark_model);
    info!(
        "  Cache: {} entries, {}s TTL",
        config.cache_capacity, config.cache_ttl
    );

    // Resolve the shared secret: injected configuration, or generated once
    // for this process lifetime.
    let auth = match &config.auth_token {
        Some(token) => TokenAuth::new(token),
        None => {
            let auth = TokenAuth::generate();
            warn!("  Auth: no token configured, generated one for this process");
            warn!("        token: {}", auth.token());
            warn!("        restart will invalidate it; set FACEMARK_AUTH_TOKEN to pin one");
            auth
        }
    };

    // Connect to the store and create the schema
    info!("Connecting to database...");
    let db = match store::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to {}: {}", config.database_url, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = store::init_schema(&db).await {
        error!("Failed to initialize schema: {}", e);
        return ExitCode::FAILURE;
    }

    // Load the landmark model
    info!("Loading landmark model...");
    let detector = match OnnxLandmarkDetector::load(&config.landmark_model) {
        Ok(detector) => detector,
        Err(e) => {
            error!("Failed to load landmark model: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Build the router
    let router_config = build_router_config(&config, &auth);
    let router = create_router(db, Annotator::new(detector), router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -H 'token: <token>' 'http://{}/users?search=a'",
        addr
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "facemark=debug,tower_http=debug"
    } else {
        "facemark=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config, auth: &TokenAuth) -> RouterConfig {
    let mut router_config = RouterConfig::new(auth.token()).with_cache_policy(
        config.cache_capacity,
        std::time::Duration::from_secs(config.cache_ttl),
    );

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
