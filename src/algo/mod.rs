//! Graph algorithms module
//!
//! The search algorithms live in the `sixdegrees-graph-algorithms` crate and
//! know nothing about people or movies. This module provides the
//! integration/adapter layer: projecting a snapshot's participations into a
//! [`GraphView`] and running the configured search strategy over it.

use crate::graph::store::EdgeKey;
use crate::graph::NodeIdx;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// Re-export algorithms
pub use sixdegrees_graph_algorithms::{
    bfs, bidirectional_bfs, GraphView, LimitKind, NodeIndex, NodePath, SearchLimits,
    SearchOutcome,
};

/// Build the undirected view of a snapshot's participations
///
/// Edge keys are (person, movie, category) indices; the category index becomes
/// the edge label so adjacency can report it.
pub fn build_view(node_count: usize, edges: &[EdgeKey]) -> GraphView {
    GraphView::from_edge_list(node_count, edges)
}

/// Which search algorithm answers path queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Grow frontiers from both ends and meet in the middle
    #[default]
    Bidirectional,
    /// Plain BFS from the start node
    Unidirectional,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Bidirectional => write!(f, "bidirectional"),
            Strategy::Unidirectional => write!(f, "unidirectional"),
        }
    }
}

/// Run a shortest-path search between two snapshot nodes
pub fn shortest_path(
    view: &GraphView,
    start: NodeIdx,
    end: NodeIdx,
    strategy: Strategy,
    limits: &SearchLimits,
) -> SearchOutcome {
    let (source, target) = (start.as_usize(), end.as_usize());
    let outcome = match strategy {
        Strategy::Bidirectional => bidirectional_bfs(view, source, target, limits),
        Strategy::Unidirectional => bfs(view, source, target, limits),
    };
    if let SearchOutcome::LimitExceeded(kind) = outcome {
        debug!(%start, %end, %strategy, ?kind, "Path search stopped by limit");
    }
    outcome
}
