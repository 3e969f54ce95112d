//! Query-serving HTTP layer
//!
//! A thin axum front over [`PathEngine`](crate::query::PathEngine):
//! - `GET /path?start=&end=` shortest path (aliases `start_id`, `end_id`)
//! - `GET /search?q=` name/title search
//! - `GET /api/status` snapshot size and generation
//! - `POST /api/reload` rebuild the snapshot from the processed files

pub mod handler;
pub mod server;

pub use handler::{ApiError, PathParams, SearchParams};
pub use server::{is_local_origin, router, AppState, HttpServer, ServerConfig};
