//! HTTP handlers for the path/search API

use super::server::AppState;
use crate::graph::load_snapshot;
use crate::query::QueryError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

/// Query string of `GET /path`
#[derive(Debug, Deserialize)]
pub struct PathParams {
    #[serde(alias = "start_id")]
    pub start: Option<String>,
    #[serde(alias = "end_id")]
    pub end: Option<String>,
}

/// Query string of `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Error response: `{"detail": "..."}` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn missing(param: &str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Missing query parameter: {param}"),
        )
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        let status = match e {
            QueryError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            QueryError::SearchTooShort { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Handler for shortest-path queries
pub async fn path_handler(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> Result<Response, ApiError> {
    let start = params.start.ok_or_else(|| ApiError::missing("start"))?;
    let end = params.end.ok_or_else(|| ApiError::missing("end"))?;

    // Large searches are CPU-bound; keep them off the async workers
    let snapshot = state.graph.snapshot();
    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || {
        engine.find_shortest_path_str(&snapshot, &start, &end)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Path search failed: {e}")))??;

    Ok(Json(result).into_response())
}

/// Handler for name/title search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let q = params.q.ok_or_else(|| ApiError::missing("q"))?;
    let snapshot = state.graph.snapshot();
    let hits = state.engine.search(&snapshot, &q)?;
    Ok(Json(hits).into_response())
}

/// Handler for system status
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.graph.snapshot();
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "generation": state.graph.generation(),
        "graph": snapshot.statistics(),
    }))
}

/// Rebuild the snapshot from the processed files and publish it
///
/// Queries keep running against the previous snapshot until the swap.
pub async fn reload_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    info!("Reloading graph from processed files");
    let paths = state.processed.clone();
    let chunk_size = state.chunk_size;
    let loaded = tokio::task::spawn_blocking(move || load_snapshot(&paths, chunk_size))
        .await
        .map_err(|e| ApiError::internal(format!("Reload failed: {e}")))?;

    let (snapshot, report) = loaded.map_err(|e| {
        error!(error = %e, "Reload failed; keeping the current graph");
        ApiError::internal(e.to_string())
    })?;

    let stats = snapshot.statistics();
    state.graph.replace(snapshot);
    Ok(Json(json!({
        "generation": state.graph.generation(),
        "graph": stats,
        "load": report,
    }))
    .into_response())
}
