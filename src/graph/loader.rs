//! Builds a snapshot from the processed files
//!
//! Nodes are loaded before edges so every participation can be checked
//! against the final node sets. Rows the builder rejects (duplicates, dangling
//! edges) are counted rather than aborting the load: the processed files are
//! expected to be clean, and a few bad rows should not keep the service from
//! starting.

use super::snapshot::GraphSnapshot;
use super::store::{GraphError, GraphStore};
use super::{Movie, ParticipationEdge, Person};
use crate::pipeline::normalize::drive;
use crate::pipeline::source::decode;
use crate::pipeline::{PipelineResult, ProcessedPaths, RawSource, SourceFormat, StageReport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Row accounting of a snapshot load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub movies: u64,
    pub people: u64,
    pub participations: u64,
    /// Rows that could not be decoded
    pub malformed: u64,
    /// Nodes whose identifier was already loaded
    pub duplicate_nodes: u64,
    /// Participations already loaded
    pub duplicate_edges: u64,
    /// Participations whose person or movie does not exist
    pub dangling_edges: u64,
}

impl LoadReport {
    pub fn rejected(&self) -> u64 {
        self.duplicate_nodes + self.duplicate_edges + self.dangling_edges
    }

    fn record(&mut self, error: &GraphError) {
        debug!(%error, "Row rejected while loading");
        match error {
            GraphError::DuplicateNode { .. } => self.duplicate_nodes += 1,
            GraphError::DuplicateEdge { .. } => self.duplicate_edges += 1,
            GraphError::UnknownPerson(_) | GraphError::UnknownMovie(_) => self.dangling_edges += 1,
            GraphError::CapacityExceeded(_) => {}
        }
    }
}

fn load_table<T, F>(path: &Path, chunk_size: usize, mut add: F) -> PipelineResult<u64>
where
    T: DeserializeOwned + Send,
    F: FnMut(T),
{
    let mut source = RawSource::open(path, SourceFormat::Csv)?;
    let headers = source.headers().clone();
    let mut report = StageReport::new("load");
    drive(
        &mut source,
        chunk_size,
        &mut report,
        |record| decode::<T>(record, &headers).map(Some),
        |row, _| {
            add(row);
            Ok(())
        },
    )?;
    Ok(report.malformed)
}

/// Load the processed movies, people and roles into a new snapshot
pub fn load_snapshot(
    paths: &ProcessedPaths,
    chunk_size: usize,
) -> PipelineResult<(GraphSnapshot, LoadReport)> {
    let chunk_size = chunk_size.max(1);
    let mut store = GraphStore::new();
    let mut report = LoadReport::default();
    let mut capacity: Option<GraphError> = None;

    let malformed = load_table(&paths.movies, chunk_size, |movie: Movie| {
        match store.add_movie(movie) {
            Ok(_) => report.movies += 1,
            Err(GraphError::CapacityExceeded(n)) => capacity = Some(GraphError::CapacityExceeded(n)),
            Err(e) => report.record(&e),
        }
    })?;

    report.malformed += malformed;

    let malformed = load_table(&paths.people, chunk_size, |person: Person| {
        match store.add_person(person) {
            Ok(_) => report.people += 1,
            Err(GraphError::CapacityExceeded(n)) => capacity = Some(GraphError::CapacityExceeded(n)),
            Err(e) => report.record(&e),
        }
    })?;

    report.malformed += malformed;

    let malformed = load_table(&paths.roles, chunk_size, |edge: ParticipationEdge| {
        match store.add_participation(&edge) {
            Ok(()) => report.participations += 1,
            Err(e) => report.record(&e),
        }
    })?;
    report.malformed += malformed;

    if let Some(error) = capacity {
        warn!(%error, "Node table full; remaining nodes were not loaded");
    }
    if report.rejected() > 0 || report.malformed > 0 {
        warn!(
            duplicate_nodes = report.duplicate_nodes,
            duplicate_edges = report.duplicate_edges,
            dangling_edges = report.dangling_edges,
            malformed = report.malformed,
            "Processed files contain rows the graph rejected"
        );
    }

    let snapshot = store.freeze();
    info!(
        nodes = snapshot.node_count(),
        people = snapshot.person_count(),
        movies = snapshot.movie_count(),
        edges = snapshot.edge_count(),
        "Graph snapshot built"
    );
    Ok((snapshot, report))
}
