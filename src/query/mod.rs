//! Query processing module
//!
//! Answers the two questions the service is asked:
//! - the shortest chain between two people or movies, with its degrees of
//!   separation when both ends are people
//! - which people and movies match a name fragment
//!
//! Queries run against an immutable [`GraphSnapshot`] and never mutate it, so
//! any number of them may run in parallel.

pub mod degrees;
pub mod reference;

pub use degrees::degrees_of_separation;
pub use reference::{parse_node_ref, ReferenceError};

use crate::algo::{self, SearchLimits, SearchOutcome, Strategy};
use crate::graph::{GraphSnapshot, NodeKind, NodeRef, SearchHit};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the caller of a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("Search query must be at least {min} characters")]
    SearchTooShort { min: usize },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Query configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub strategy: Strategy,
    /// Longest path (in hops) a search looks for; `None` = unbounded
    pub max_depth: Option<usize>,
    /// Most nodes a single search may discover; `None` = unbounded
    pub max_visited: Option<usize>,
    /// Maximum number of search hits returned
    pub search_limit: usize,
    /// Shortest accepted search query, in characters
    pub min_search_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Bidirectional,
            max_depth: Some(16),
            max_visited: Some(5_000_000),
            search_limit: 20,
            min_search_len: 2,
        }
    }
}

impl QueryConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_depth: self.max_depth,
            max_visited: self.max_visited,
        }
    }
}

/// One node of a returned path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub id: String,
}

/// Answer to a shortest-path query
///
/// Not finding a path is a successful answer: `path_found` is false, `hops`
/// is 0 and `steps` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    pub path_found: bool,
    pub degrees: Option<usize>,
    pub hops: usize,
    pub steps: Vec<PathStep>,
}

impl PathResult {
    pub fn not_found() -> Self {
        Self {
            path_found: false,
            degrees: None,
            hops: 0,
            steps: Vec::new(),
        }
    }
}

/// Stateless query engine
#[derive(Debug, Clone, Default)]
pub struct PathEngine {
    config: QueryConfig,
}

impl PathEngine {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Shortest path between two node references
    ///
    /// A reference to a node the snapshot does not contain cannot be reached,
    /// so it yields "not found" rather than an error.
    pub fn find_shortest_path(
        &self,
        snapshot: &GraphSnapshot,
        start: &NodeRef,
        end: &NodeRef,
    ) -> PathResult {
        let (Some(from), Some(to)) = (snapshot.resolve(start), snapshot.resolve(end)) else {
            debug!(%start, %end, "Path endpoint not in graph");
            return PathResult::not_found();
        };

        let started = Instant::now();
        let outcome = algo::shortest_path(
            snapshot.view(),
            from,
            to,
            self.config.strategy,
            &self.config.limits(),
        );
        debug!(
            %start,
            %end,
            elapsed_us = started.elapsed().as_micros() as u64,
            found = matches!(outcome, SearchOutcome::Found(_)),
            "Path search finished"
        );

        let Some(path) = outcome.into_path() else {
            return PathResult::not_found();
        };

        let steps: Vec<PathStep> = path
            .nodes
            .iter()
            .filter_map(|&idx| snapshot.nodes().get(idx))
            .map(|node| PathStep {
                kind: node.kind,
                name: node.name.clone(),
                id: node.id.clone(),
            })
            .collect();
        let hops = path.hops();

        PathResult {
            path_found: true,
            degrees: degrees_of_separation(start.kind, end.kind, hops),
            hops,
            steps,
        }
    }

    /// Parse both references, then search
    pub fn find_shortest_path_str(
        &self,
        snapshot: &GraphSnapshot,
        start: &str,
        end: &str,
    ) -> QueryResult<PathResult> {
        let start = parse_node_ref(start)?;
        let end = parse_node_ref(end)?;
        Ok(self.find_shortest_path(snapshot, &start, &end))
    }

    /// People and movies whose name matches `query`
    pub fn search(&self, snapshot: &GraphSnapshot, query: &str) -> QueryResult<Vec<SearchHit>> {
        let min = self.config.min_search_len;
        if query.trim().chars().count() < min {
            return Err(QueryError::SearchTooShort { min });
        }
        Ok(snapshot.search(query, self.config.search_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, Movie, ParticipationEdge, Person};

    /// Bacon -Footloose- Singer -Trouble- Hanks, and an unconnected Loner
    fn snapshot() -> GraphSnapshot {
        let mut store = GraphStore::new();
        store.add_person(Person::new("nm0000102", "Kevin Bacon", Some(1958))).unwrap();
        store.add_person(Person::new("nm0001742", "Lori Singer", Some(1957))).unwrap();
        store.add_person(Person::new("nm0000158", "Tom Hanks", Some(1956))).unwrap();
        store.add_person(Person::new("nm9999999", "Loner", None)).unwrap();
        store.add_movie(Movie::new("tt0087277", "Footloose", Some(1984))).unwrap();
        store.add_movie(Movie::new("tt0091000", "Trouble", Some(1986))).unwrap();
        store.add_movie(Movie::new("tt0000001", "Solo", None)).unwrap();
        for (p, m, c) in [
            ("nm0000102", "tt0087277", "actor"),
            ("nm0001742", "tt0087277", "actress"),
            ("nm0001742", "tt0091000", "actress"),
            ("nm0000158", "tt0091000", "actor"),
            ("nm9999999", "tt0000001", "director"),
        ] {
            store.add_participation(&ParticipationEdge::new(p, m, c)).unwrap();
        }
        store.freeze()
    }

    #[test]
    fn test_person_to_person() {
        let engine = PathEngine::default();
        let result = engine
            .find_shortest_path_str(&snapshot(), "nm0000102", "person:nm0000158")
            .unwrap();
        assert!(result.path_found);
        assert_eq!(result.hops, 4);
        assert_eq!(result.degrees, Some(2));
        let ids: Vec<_> = result.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["nm0000102", "tt0087277", "nm0001742", "tt0091000", "nm0000158"]);
        assert_eq!(result.steps[1].kind, NodeKind::Movie);
        assert_eq!(result.steps[1].name, "Footloose");
    }

    #[test]
    fn test_movie_endpoint_has_no_degrees() {
        let engine = PathEngine::default();
        let result = engine
            .find_shortest_path_str(&snapshot(), "tt0087277", "nm0001742")
            .unwrap();
        assert_eq!(result.hops, 1);
        assert_eq!(result.degrees, None);
    }

    #[test]
    fn test_same_node() {
        let engine = PathEngine::default();
        let result = engine
            .find_shortest_path(&snapshot(), &NodeRef::person("nm0000102"), &NodeRef::person("nm0000102"));
        assert!(result.path_found);
        assert_eq!(result.hops, 0);
        assert_eq!(result.degrees, Some(0));
        assert_eq!(result.steps.len(), 1);
    }

    #[test]
    fn test_disconnected_and_unknown() {
        let engine = PathEngine::default();
        let snapshot = snapshot();
        let result = engine.find_shortest_path_str(&snapshot, "nm0000102", "nm9999999").unwrap();
        assert_eq!(result, PathResult::not_found());

        let result = engine.find_shortest_path_str(&snapshot, "nm0000102", "nm1234567").unwrap();
        assert!(!result.path_found);
    }

    #[test]
    fn test_invalid_reference() {
        let engine = PathEngine::default();
        let err = engine
            .find_shortest_path_str(&snapshot(), "studio:co1", "nm0000102")
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidReference(ReferenceError::UnknownKind("studio".to_string()))
        );
    }

    #[test]
    fn test_depth_limit_reports_not_found() {
        let engine = PathEngine::new(QueryConfig {
            max_depth: Some(2),
            ..Default::default()
        });
        let result = engine
            .find_shortest_path_str(&snapshot(), "nm0000102", "nm0000158")
            .unwrap();
        assert!(!result.path_found);
    }

    #[test]
    fn test_search() {
        let engine = PathEngine::default();
        let snapshot = snapshot();
        assert_eq!(
            engine.search(&snapshot, "k"),
            Err(QueryError::SearchTooShort { min: 2 })
        );
        let hits = engine.search(&snapshot, "lo").unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Loner", "Lori Singer", "Footloose", "Solo"]);
    }

    #[test]
    fn test_path_result_json_shape() {
        let json = serde_json::to_value(PathResult {
            path_found: true,
            degrees: None,
            hops: 1,
            steps: vec![PathStep {
                kind: NodeKind::Movie,
                name: "Footloose".to_string(),
                id: "tt0087277".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(json["path_found"], true);
        assert!(json["degrees"].is_null());
        assert_eq!(json["steps"][0]["type"], "movie");
    }
}
