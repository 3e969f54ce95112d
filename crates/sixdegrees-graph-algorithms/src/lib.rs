//! Shortest-path search over compact, undirected graph views.
//!
//! The crate knows nothing about people or movies: callers project their graph
//! into a [`GraphView`] (dense `0..N` indices, CSR adjacency, one `u32` label
//! per edge) and map indices back themselves.

pub mod common;
pub mod pathfinding;

pub use common::{GraphView, NodeIndex};
pub use pathfinding::{bfs, bidirectional_bfs, LimitKind, NodePath, SearchLimits, SearchOutcome};
