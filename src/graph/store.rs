//! In-memory bipartite graph builder
//!
//! `GraphStore` accepts people, movies and participations, enforcing the
//! construction invariants as it goes:
//! - one node per (kind, identifier); later duplicates are rejected
//! - every edge references an existing person and an existing movie
//! - edges only ever connect a person to a movie
//! - no duplicate (person, movie, category) edge
//!
//! Once loaded, [`GraphStore::freeze`] turns it into an immutable
//! [`GraphSnapshot`] for querying.

use super::edge::ParticipationEdge;
use super::node::{Movie, Node, Person};
use super::snapshot::GraphSnapshot;
use super::types::{Category, NodeIdx, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Errors that can occur while building the graph
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("{kind} {id} already exists")]
    DuplicateNode { kind: NodeKind, id: String },

    #[error("Participation {person} -[{category}]-> {movie} already exists")]
    DuplicateEdge {
        person: String,
        movie: String,
        category: Category,
    },

    #[error("Invalid edge: person {0} does not exist")]
    UnknownPerson(String),

    #[error("Invalid edge: movie {0} does not exist")]
    UnknownMovie(String),

    #[error("Graph capacity exceeded: more than {0} nodes")]
    CapacityExceeded(u32),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Interned participation: (person, movie, category) indices
pub(crate) type EdgeKey = (u32, u32, u32);

/// Mutable graph under construction
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node table; position is the node's dense index
    nodes: Vec<Node>,

    /// Person identifier -> index
    people: FxHashMap<String, NodeIdx>,

    /// Movie identifier -> index
    movies: FxHashMap<String, NodeIdx>,

    /// Interned categories
    categories: Vec<Category>,
    category_index: FxHashMap<Category, u32>,

    /// Participations in insertion order
    edges: Vec<EdgeKey>,
    edge_set: FxHashSet<EdgeKey>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person node; rejects an identifier that is already present
    pub fn add_person(&mut self, person: Person) -> GraphResult<NodeIdx> {
        if self.people.contains_key(&person.id) {
            return Err(GraphError::DuplicateNode {
                kind: NodeKind::Person,
                id: person.id,
            });
        }
        let idx = self.next_index()?;
        self.people.insert(person.id.clone(), idx);
        self.nodes.push(person.into());
        Ok(idx)
    }

    /// Add a movie node; rejects an identifier that is already present
    pub fn add_movie(&mut self, movie: Movie) -> GraphResult<NodeIdx> {
        if self.movies.contains_key(&movie.id) {
            return Err(GraphError::DuplicateNode {
                kind: NodeKind::Movie,
                id: movie.id,
            });
        }
        let idx = self.next_index()?;
        self.movies.insert(movie.id.clone(), idx);
        self.nodes.push(movie.into());
        Ok(idx)
    }

    /// Add a participation edge between an existing person and movie
    pub fn add_participation(&mut self, edge: &ParticipationEdge) -> GraphResult<()> {
        let person = *self
            .people
            .get(&edge.person_id)
            .ok_or_else(|| GraphError::UnknownPerson(edge.person_id.clone()))?;
        let movie = *self
            .movies
            .get(&edge.movie_id)
            .ok_or_else(|| GraphError::UnknownMovie(edge.movie_id.clone()))?;
        let category = self.intern(&edge.category);

        let key = (person.0, movie.0, category);
        if !self.edge_set.insert(key) {
            return Err(GraphError::DuplicateEdge {
                person: edge.person_id.clone(),
                movie: edge.movie_id.clone(),
                category: edge.category.clone(),
            });
        }
        self.edges.push(key);
        Ok(())
    }

    /// Look up a node by kind and identifier
    pub fn resolve(&self, kind: NodeKind, id: &str) -> Option<NodeIdx> {
        match kind {
            NodeKind::Person => self.people.get(id).copied(),
            NodeKind::Movie => self.movies.get(id).copied(),
        }
    }

    pub fn get_node(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.as_usize())
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
        self.edges.len()
    }

    /// Iterate participations as (person, movie, category)
    pub fn participations(&self) -> impl Iterator<Item = (&Node, &Node, &Category)> + '_ {
        self.edges.iter().map(move |&(p, m, c)| {
            (
                &self.nodes[p as usize],
                &self.nodes[m as usize],
                &self.categories[c as usize],
            )
        })
    }

    /// Finish construction and produce an immutable, queryable snapshot
    pub fn freeze(self) -> GraphSnapshot {
        GraphSnapshot::from_parts(
            self.nodes,
            self.people,
            self.movies,
            self.categories,
            self.edges,
        )
    }

    fn next_index(&self) -> GraphResult<NodeIdx> {
        u32::try_from(self.nodes.len())
            .map(NodeIdx::new)
            .map_err(|_| GraphError::CapacityExceeded(u32::MAX))
    }

    fn intern(&mut self, category: &Category) -> u32 {
        if let Some(&idx) = self.category_index.get(category) {
            return idx;
        }
        let idx = self.categories.len() as u32;
        self.categories.push(category.clone());
        self.category_index.insert(category.clone(), idx);
        idx
    }
}
