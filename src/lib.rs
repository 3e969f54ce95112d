//! Six Degrees
//!
//! Shortest collaboration chains between people and movies of a large
//! filmography dataset, with "degrees of separation" for person-to-person
//! queries.
//!
//! # Architecture
//!
//! - [`pipeline`]: streams the raw title/name/principal tables into three
//!   processed files that form a referentially consistent bipartite graph,
//!   and exports them for bulk import
//! - [`graph`]: people, movies and participations; a validating builder and
//!   immutable CSR snapshots behind an atomically swappable handle
//! - [`algo`]: adapter to the BFS / bidirectional BFS in
//!   `sixdegrees-graph-algorithms`
//! - [`query`]: node reference parsing, the path engine and the degrees
//!   translator
//! - [`http`]: thin axum API over the path engine
//!
//! ## Example Usage
//!
//! ```rust
//! use sixdegrees::graph::{GraphStore, Movie, ParticipationEdge, Person};
//! use sixdegrees::query::PathEngine;
//!
//! let mut store = GraphStore::new();
//! store.add_person(Person::new("nm0000102", "Kevin Bacon", Some(1958))).unwrap();
//! store.add_person(Person::new("nm0001742", "Lori Singer", Some(1957))).unwrap();
//! store.add_movie(Movie::new("tt0087277", "Footloose", Some(1984))).unwrap();
//! store.add_participation(&ParticipationEdge::new("nm0000102", "tt0087277", "actor")).unwrap();
//! store.add_participation(&ParticipationEdge::new("nm0001742", "tt0087277", "actress")).unwrap();
//! let snapshot = store.freeze();
//!
//! let result = PathEngine::default()
//!     .find_shortest_path_str(&snapshot, "nm0000102", "person:nm0001742")
//!     .unwrap();
//! assert!(result.path_found);
//! assert_eq!(result.hops, 2);
//! assert_eq!(result.degrees, Some(1));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod http;
pub mod pipeline;
pub mod query;

// Re-export main types for convenience
pub use config::{Config, ConfigError, ConfigResult};

pub use graph::{
    load_snapshot, GraphError, GraphHandle, GraphResult, GraphSnapshot, GraphStore, Movie, Node,
    NodeKind, NodeRef, ParticipationEdge, Person,
};

pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineReport, PipelineResult};

pub use query::{
    parse_node_ref, PathEngine, PathResult, PathStep, QueryConfig, QueryError, QueryResult,
    ReferenceError,
};

pub use http::{HttpServer, ServerConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
