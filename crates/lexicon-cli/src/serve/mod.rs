//! Reference taxonomy server.
//!
//! Serves the remote interfaces the cache loader and the admin operations
//! talk to, backed by a JSON catalog on disk.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - request/error types

mod handlers;
mod models;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use lexicon_core::config::{
    Config, DEFAULT_GRAPH_PATH, DEFAULT_NAVIGATE_PATH, DEFAULT_TERMS_PATH,
};
use lexicon_core::{Catalog, Classifier};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// The authoritative taxonomy.
    pub catalog: RwLock<Catalog>,
    /// Chooses parents for new terms.
    pub classifier: Box<dyn Classifier>,
    /// `max-age` sent with the graph.
    pub graph_max_age_secs: u64,
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the taxonomy server.
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Path to the catalog document.
    pub catalog_path: PathBuf,
    pub graph_max_age_secs: u64,
}

impl ServeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            catalog_path: PathBuf::from(&config.server.catalog_path),
            graph_max_age_secs: config.server.graph_max_age_secs,
        }
    }
}

// =============================================================================
// Server Entry Point
// =============================================================================

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(DEFAULT_GRAPH_PATH, get(handlers::api_graph))
        .route(DEFAULT_NAVIGATE_PATH, get(handlers::api_navigate))
        .route(DEFAULT_TERMS_PATH, post(handlers::api_add_term))
        .route(
            &format!("{DEFAULT_TERMS_PATH}/{{id}}"),
            delete(handlers::api_delete_term),
        )
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Start the taxonomy server.
pub async fn start_server(
    config: ServeConfig,
    classifier: Box<dyn Classifier>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::open(&config.catalog_path)?;
    tracing::info!(
        path = %config.catalog_path.display(),
        terms = catalog.graph().len(),
        "catalog opened"
    );

    let state = Arc::new(AppState {
        catalog: RwLock::new(catalog),
        classifier,
        graph_max_age_secs: config.graph_max_age_secs,
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    println!("Starting Lexicon server...");
    println!("API: http://{}{}", addr, DEFAULT_GRAPH_PATH);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
