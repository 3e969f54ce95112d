//! People/movie graph
//!
//! This module implements the bipartite graph model:
//! - Two node kinds (people, movies) in disjoint identifier namespaces
//! - Typed participation edges, stored Person -> Movie, traversed both ways
//! - A mutable builder that enforces integrity while loading
//! - Immutable snapshots with CSR adjacency for queries, swapped atomically

pub mod edge;
pub mod loader;
pub mod node;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::ParticipationEdge;
pub use loader::{load_snapshot, LoadReport};
pub use node::{Movie, Node, Person};
pub use search::SearchHit;
pub use snapshot::{GraphHandle, GraphSnapshot, GraphStatistics, Neighbor};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{
    Category, NodeIdx, NodeKind, NodeRef, DEFAULT_CATEGORIES, PARTICIPATION_EDGE_TYPE,
};
