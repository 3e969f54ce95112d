//! Curated amendments
//!
//! Operators occasionally need records the raw dataset lacks (a person
//! missing from the name table, a crew credit outside the retained
//! categories). An amendment appends them to the processed files while
//! keeping the files' invariants: no duplicate identifier, no duplicate
//! role, no role pointing at an unknown person or movie, and no person
//! without a role.

use super::integrity::{collect_movie_ids, collect_person_ids};
use super::normalize::drive;
use super::source::{decode, RawSource, SourceFormat};
use super::writer::{RecordWriter, TabularRecord, WriteMode};
use super::{PipelineError, PipelineResult, ProcessedPaths, StageReport};
use crate::graph::{Category, Movie, ParticipationEdge, Person};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Records to append, usually read from a YAML file
///
/// Field names follow the processed columns:
///
/// ```yaml
/// people:
///   - { nconst: nm12228615, primaryName: Sydney Balangue, birthYear: null }
/// roles:
///   - { tconst: tt16366836, nconst: nm12228615, category: production_secretary }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amendment {
    pub people: Vec<Person>,
    pub movies: Vec<Movie>,
    pub roles: Vec<ParticipationEdge>,
}

impl Amendment {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.movies.is_empty() && self.roles.is_empty()
    }
}

/// Outcome of an amendment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AmendReport {
    pub people_added: u64,
    pub movies_added: u64,
    pub roles_added: u64,
    /// Human-readable reason for every record that was not appended
    pub rejected: Vec<String>,
}

type RoleKey = (String, String, Category);

fn role_key(edge: &ParticipationEdge) -> RoleKey {
    (
        edge.person_id.clone(),
        edge.movie_id.clone(),
        edge.category.clone(),
    )
}

/// Roles of `wanted` that already exist in the roles file
fn existing_roles(
    roles: &Path,
    wanted: &FxHashSet<RoleKey>,
    chunk_size: usize,
) -> PipelineResult<FxHashSet<RoleKey>> {
    let mut source = RawSource::open(roles, SourceFormat::Csv)?;
    let headers = source.headers().clone();
    let mut found = FxHashSet::default();
    let mut report = StageReport::new("roles");
    drive(
        &mut source,
        chunk_size,
        &mut report,
        |record| {
            let edge: ParticipationEdge = decode(record, &headers)?;
            Ok(wanted.contains(&role_key(&edge)).then_some(edge))
        },
        |edge, _| {
            found.insert(role_key(&edge));
            Ok(())
        },
    )?;
    Ok(found)
}

fn reject(reason: String) -> String {
    warn!(%reason, "Amendment record rejected");
    reason
}

fn append<T: TabularRecord>(path: &Path, records: &[T]) -> PipelineResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }
    let mut writer = RecordWriter::create(path, WriteMode::Append)?;
    writer.write_chunk(records)?;
    writer.finish()
}

/// Append an amendment to the processed files in `paths`
///
/// The processed files must already exist (run the pipeline first).
pub fn apply_amendment(
    paths: &ProcessedPaths,
    amendment: &Amendment,
    chunk_size: usize,
) -> PipelineResult<AmendReport> {
    for path in [&paths.movies, &paths.people, &paths.roles] {
        if !path.exists() {
            return Err(PipelineError::SourceUnreadable {
                path: path.clone(),
                reason: "processed file does not exist".to_string(),
            });
        }
    }

    let mut report = AmendReport::default();

    let mut movie_ids = collect_movie_ids(&paths.movies, chunk_size)?;
    let mut new_movies = Vec::new();
    for movie in &amendment.movies {
        if movie_ids.insert(movie.id.clone()) {
            new_movies.push(movie.clone());
        } else {
            report.rejected.push(reject(format!("movie {} already exists", movie.id)));
        }
    }

    let mut person_ids = collect_person_ids(&paths.people, chunk_size)?;
    let mut new_people = Vec::new();
    for person in &amendment.people {
        if person_ids.insert(person.id.clone()) {
            new_people.push(person.clone());
        } else {
            report.rejected.push(reject(format!("person {} already exists", person.id)));
        }
    }

    let wanted: FxHashSet<RoleKey> = amendment.roles.iter().map(role_key).collect();
    let mut seen = existing_roles(&paths.roles, &wanted, chunk_size)?;
    let mut new_roles = Vec::new();
    for role in &amendment.roles {
        let label = format!("{} -[{}]-> {}", role.person_id, role.category, role.movie_id);
        if !person_ids.contains(&role.person_id) {
            report
                .rejected
                .push(reject(format!("role {label}: unknown person {}", role.person_id)));
        } else if !movie_ids.contains(&role.movie_id) {
            report
                .rejected
                .push(reject(format!("role {label}: unknown movie {}", role.movie_id)));
        } else if !seen.insert(role_key(role)) {
            report.rejected.push(reject(format!("role {label} already exists")));
        } else {
            new_roles.push(role.clone());
        }
    }

    // A person enters the people file only together with a role
    let cast: FxHashSet<&str> = new_roles.iter().map(|r| r.person_id.as_str()).collect();
    let (new_people, uncast): (Vec<Person>, Vec<Person>) = new_people
        .into_iter()
        .partition(|p| cast.contains(p.id.as_str()));
    for person in uncast {
        report
            .rejected
            .push(reject(format!("person {} has no accepted role", person.id)));
    }

    report.movies_added = append(&paths.movies, &new_movies)?;
    report.people_added = append(&paths.people, &new_people)?;
    report.roles_added = append(&paths.roles, &new_roles)?;

    info!(
        movies = report.movies_added,
        people = report.people_added,
        roles = report.roles_added,
        rejected = report.rejected.len(),
        "Amendment applied"
    );
    Ok(report)
}
