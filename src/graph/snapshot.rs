//! Immutable graph snapshots and the atomically swappable handle around them
//!
//! A snapshot is built once per dataset refresh and never mutated. Queries
//! clone the current `Arc<GraphSnapshot>` out of a [`GraphHandle`] and then run
//! without holding any lock; a refresh publishes a whole new snapshot, so no
//! reader ever observes a partially rebuilt graph.

use super::node::Node;
use super::search::{NameIndex, SearchHit};
use super::store::EdgeKey;
use super::types::{Category, NodeIdx, NodeKind, NodeRef};
use crate::algo::{self, GraphView};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// One adjacency entry of a node, resolved against the node table
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub idx: NodeIdx,
    pub node: &'a Node,
    pub category: &'a Category,
}

/// Size summary of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub nodes: usize,
    pub people: usize,
    pub movies: usize,
    pub edges: usize,
}

/// Read-only bipartite graph ready for path queries
#[derive(Debug, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    people: FxHashMap<String, NodeIdx>,
    movies: FxHashMap<String, NodeIdx>,
    categories: Vec<Category>,
    view: GraphView,
    edge_count: usize,
    names: NameIndex,
}

impl GraphSnapshot {
    /// An empty graph (used before the first dataset is loaded)
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        people: FxHashMap<String, NodeIdx>,
        movies: FxHashMap<String, NodeIdx>,
        categories: Vec<Category>,
        edges: Vec<EdgeKey>,
    ) -> Self {
        let view = algo::build_view(nodes.len(), &edges);
        let names = NameIndex::build(&nodes);
        Self {
            edge_count: edges.len(),
            nodes,
            people,
            movies,
            categories,
            view,
            names,
        }
    }

    /// Resolve a node reference to its dense index
    pub fn resolve(&self, node_ref: &NodeRef) -> Option<NodeIdx> {
        match node_ref.kind {
            NodeKind::Person => self.people.get(&node_ref.id).copied(),
            NodeKind::Movie => self.movies.get(&node_ref.id).copied(),
        }
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.as_usize())
    }

    /// All nodes, in index order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Adjacency of a node: (neighbor, neighbor kind via the node, category)
    ///
    /// Participations are undirected for traversal, so a movie lists its
    /// people and a person lists their movies.
    pub fn neighbors(&self, idx: NodeIdx) -> impl Iterator<Item = Neighbor<'_>> + '_ {
        let i = idx.as_usize();
        let slots = if i < self.view.node_count {
            self.view.offsets[i]..self.view.offsets[i + 1]
        } else {
            0..0
        };
        slots.map(move |slot| {
            let n = self.view.targets[slot];
            Neighbor {
                idx: NodeIdx::new(n),
                node: &self.nodes[n as usize],
                category: &self.categories[self.view.labels[slot] as usize],
            }
        })
    }

    /// The CSR projection used by the search algorithms
    pub fn view(&self) -> &GraphView {
        &self.view
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            nodes: self.node_count(),
            people: self.person_count(),
            movies: self.movie_count(),
            edges: self.edge_count(),
        }
    }

    /// Case-insensitive name/title search (prefix matches first)
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.names.search(&self.nodes, query, limit)
    }
}

/// Shared, swappable reference to the current snapshot
#[derive(Debug)]
pub struct GraphHandle {
    current: RwLock<Arc<GraphSnapshot>>,
    generation: AtomicU64,
}

impl GraphHandle {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            generation: AtomicU64::new(1),
        }
    }

    /// The snapshot queries should run against
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Publish a rebuilt snapshot; returns the one it replaced
    ///
    /// Readers that already hold the old snapshot keep using it until they drop it.
    pub fn replace(&self, snapshot: GraphSnapshot) -> Arc<GraphSnapshot> {
        let stats = snapshot.statistics();
        let next = Arc::new(snapshot);
        let mut current = self.current.write();
        let previous = std::mem::replace(&mut *current, next);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(current);

        info!(
            generation,
            nodes = stats.nodes,
            edges = stats.edges,
            "Published graph snapshot"
        );
        previous
    }

    /// Number of snapshots published so far (starting at 1)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for GraphHandle {
    fn default() -> Self {
        Self::new(GraphSnapshot::empty())
    }
}
