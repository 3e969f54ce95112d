//! HTTP server for the path/search API

use super::handler::{path_handler, reload_handler, search_handler, status_handler};
use crate::graph::GraphHandle;
use crate::pipeline::ProcessedPaths;
use crate::query::PathEngine;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    /// Accept cross-origin requests from any origin instead of localhost only
    pub allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
            allow_any_origin: false,
        }
    }
}

/// Shared state of the handlers
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<GraphHandle>,
    pub engine: Arc<PathEngine>,
    /// Files a reload rebuilds the graph from
    pub processed: ProcessedPaths,
    pub chunk_size: usize,
}

/// `http://localhost[:port]` or `http://127.0.0.1[:port]`
pub fn is_local_origin(origin: &[u8]) -> bool {
    let Ok(origin) = std::str::from_utf8(origin) else {
        return false;
    };
    let Some(host) = origin.strip_prefix("http://") else {
        return false;
    };
    let rest = host
        .strip_prefix("localhost")
        .or_else(|| host.strip_prefix("127.0.0.1"));
    match rest {
        Some("") => true,
        Some(port) => port
            .strip_prefix(':')
            .is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

fn cors(config: &ServerConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            is_local_origin(origin.as_bytes())
        }))
        .allow_methods([Method::GET, Method::POST])
}

/// Build the API router
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/path", get(path_handler))
        .route("/search", get(search_handler))
        .route("/api/status", get(status_handler))
        .route("/api/reload", post(reload_handler))
        .layer(cors(config))
        .with_state(state)
}

/// HTTP server serving path and search queries
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = router(self.state, &self.config);

        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("API available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
