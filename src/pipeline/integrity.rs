//! Referential integrity filter
//!
//! Re-scans an already written roles file and keeps only the rows a predicate
//! accepts, dropping repeated (movie, person, category) rows wherever they
//! occur. The result is written beside the original and renamed over it, so
//! the live file is always either the old or the new edge set.

use super::normalize::{drive, IdSet};
use super::source::{decode, RawSource, SourceFormat};
use super::writer::{RecordWriter, WriteMode};
use super::{PipelineError, PipelineResult, StageReport};
use crate::graph::{Movie, ParticipationEdge, Person};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "roles.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Interned (movie, person, category) keys of the edges kept so far
#[derive(Default)]
struct SeenEdges {
    strings: FxHashMap<String, u32>,
    keys: FxHashSet<(u32, u32, u32)>,
}

impl SeenEdges {
    fn intern(&mut self, value: &str) -> u32 {
        if let Some(&id) = self.strings.get(value) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.insert(value.to_string(), id);
        id
    }

    /// False if the same edge was already kept
    fn insert(&mut self, edge: &ParticipationEdge) -> bool {
        let key = (
            self.intern(&edge.movie_id),
            self.intern(&edge.person_id),
            self.intern(edge.category.as_str()),
        );
        self.keys.insert(key)
    }
}

/// Rewrite `path` keeping the participations `keep` accepts, once each
pub fn retain_edges<F>(path: &Path, chunk_size: usize, keep: F) -> PipelineResult<StageReport>
where
    F: Fn(&ParticipationEdge) -> bool + Sync,
{
    let temp = temp_path(path);
    let result = filter_into(path, &temp, chunk_size, keep);
    match result {
        Ok(report) => {
            std::fs::rename(&temp, path).map_err(PipelineError::io(path))?;
            debug!(path = %path.display(), "Replaced edge file");
            Ok(report)
        }
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp.display(), error = %cleanup, "Could not remove temporary file");
                }
            }
            Err(e)
        }
    }
}

fn filter_into<F>(path: &Path, temp: &Path, chunk_size: usize, keep: F) -> PipelineResult<StageReport>
where
    F: Fn(&ParticipationEdge) -> bool + Sync,
{
    let mut source = RawSource::open(path, SourceFormat::Csv)?;
    let headers = source.headers().clone();
    let mut writer = RecordWriter::create(temp, WriteMode::Fresh)?;

    let mut report = StageReport::new("integrity");
    let mut seen = SeenEdges::default();
    drive(
        &mut source,
        chunk_size,
        &mut report,
        |record| {
            let edge: ParticipationEdge = decode(record, &headers)?;
            Ok(keep(&edge).then_some(edge))
        },
        |edge, report| {
            if !seen.insert(&edge) {
                report.duplicates += 1;
                return Ok(());
            }
            writer.write(&edge)?;
            report.kept += 1;
            Ok(())
        },
    )?;
    writer.finish()?;
    Ok(report)
}

/// Stage 4: drop participations whose person was not resolved
pub fn finalize_roles(
    roles: &Path,
    resolved: &IdSet,
    chunk_size: usize,
) -> PipelineResult<StageReport> {
    let mut report = retain_edges(roles, chunk_size, |edge| {
        resolved.contains(&edge.person_id)
    })?;
    report.stage = "finalize";
    Ok(report)
}

fn collect_ids<T, F>(path: &Path, chunk_size: usize, id: F) -> PipelineResult<IdSet>
where
    T: DeserializeOwned + Send,
    F: Fn(T) -> String,
{
    let mut source = RawSource::open(path, SourceFormat::Csv)?;
    let headers = source.headers().clone();
    let mut ids = IdSet::default();
    let mut report = StageReport::new("ids");
    drive(
        &mut source,
        chunk_size,
        &mut report,
        |record| decode::<T>(record, &headers).map(Some),
        |row, _| {
            ids.insert(id(row));
            Ok(())
        },
    )?;
    if report.malformed > 0 {
        warn!(path = %path.display(), malformed = report.malformed, "Unreadable rows in processed file");
    }
    Ok(ids)
}

/// Identifiers of every person in a processed people file
pub fn collect_person_ids(people: &Path, chunk_size: usize) -> PipelineResult<IdSet> {
    collect_ids(people, chunk_size, |person: Person| person.id)
}

/// Identifiers of every movie in a processed movies file
pub fn collect_movie_ids(movies: &Path, chunk_size: usize) -> PipelineResult<IdSet> {
    collect_ids(movies, chunk_size, |movie: Movie| movie.id)
}
