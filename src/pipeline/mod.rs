//! Dataset construction pipeline
//!
//! Turns the raw title, name and principal tables into three processed files
//! that together form a referentially consistent bipartite graph:
//!
//! 1. **movies**: keep rows whose title type is `movie`, collect their ids
//! 2. **principals**: keep participations in retained movies with a retained
//!    category; the person ids seen form the *candidate* set
//! 3. **names**: keep people in the candidate set; those found form the
//!    *resolved* set
//! 4. **finalize**: re-filter the written participations to resolved people
//!
//! Person retention depends on participations and participation retention
//! depends on people, so the cycle is broken by deriving the candidate set
//! first and re-filtering edges once the resolved set is known.
//!
//! Every stage streams its input in bounded chunks; only identifier sets are
//! held across stages.

pub mod amend;
pub mod export;
pub mod integrity;
pub mod normalize;
pub mod source;
pub mod writer;

pub use amend::{apply_amendment, AmendReport, Amendment};
pub use export::{prepare_import, ImportFile, ImportReport, IMPORT_FILES};
pub use integrity::{collect_movie_ids, collect_person_ids, finalize_roles, retain_edges};
pub use normalize::{normalize_movies, normalize_names, normalize_principals, IdSet};
pub use source::{Chunk, RawSource, SourceFormat};
pub use writer::{RecordWriter, TabularRecord, WriteMode};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Fatal pipeline errors; they abort the stage that raised them
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source {} is unreadable: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Source {} has no column {column}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
        move |source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path) -> impl FnOnce(csv::Error) -> PipelineError + '_ {
        move |source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single row that could not be used; skipped and counted, never fatal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("row has {found} fields, expected {expected}")]
    FieldCount { expected: u64, found: u64 },

    #[error("column {0} is missing")]
    MissingField(&'static str),

    #[error("column {0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("required column {0} is empty")]
    EmptyField(&'static str),

    #[error("column {column} has invalid value {value:?}")]
    InvalidValue { column: &'static str, value: String },

    #[error("row does not match the processed schema: {0}")]
    Schema(String),
}

/// Per-stage row accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    /// Rows read from the source, malformed ones included
    pub rows_read: u64,
    /// Rows written to the stage output
    pub kept: u64,
    /// Well-formed rows excluded by the stage's filter
    pub filtered: u64,
    /// Rows skipped because they could not be parsed
    pub malformed: u64,
    /// Rows skipped because their identifier (or edge tuple) was already kept
    pub duplicates: u64,
}

impl StageReport {
    pub fn new(stage: &'static str) -> Self {
        StageReport {
            stage,
            ..Default::default()
        }
    }

    pub(crate) fn log(&self) {
        info!(
            stage = self.stage,
            rows_read = self.rows_read,
            kept = self.kept,
            filtered = self.filtered,
            malformed = self.malformed,
            duplicates = self.duplicates,
            "Stage complete"
        );
    }
}

/// Reports of a full pipeline run, in stage order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub movies: StageReport,
    pub principals: StageReport,
    pub names: StageReport,
    pub finalize: StageReport,
}

/// Locations of the three processed files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPaths {
    pub movies: PathBuf,
    pub people: PathBuf,
    pub roles: PathBuf,
}

impl ProcessedPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        ProcessedPaths {
            movies: dir.join("clean_movies.csv"),
            people: dir.join("clean_people.csv"),
            roles: dir.join("clean_roles.csv"),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the raw tables
    pub raw_dir: PathBuf,
    /// Directory the processed files are written to
    pub processed_dir: PathBuf,
    /// Directory the bulk-import files are written to
    pub import_dir: PathBuf,
    pub movies_file: String,
    pub names_file: String,
    pub principals_file: String,
    /// Rows per streamed chunk
    pub chunk_size: usize,
    /// Title type retained from the title table
    pub title_type: String,
    /// Participation categories retained from the principals table
    pub categories: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            import_dir: PathBuf::from("data/import"),
            movies_file: "title.basics.tsv.gz".to_string(),
            names_file: "name.basics.tsv.gz".to_string(),
            principals_file: "title.principals.tsv.gz".to_string(),
            chunk_size: 100_000,
            title_type: "movie".to_string(),
            categories: crate::graph::DEFAULT_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn processed_paths(&self) -> ProcessedPaths {
        ProcessedPaths::in_dir(&self.processed_dir)
    }

    fn raw(&self, file: &str) -> PathBuf {
        self.raw_dir.join(file)
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// Runs the four construction stages in order
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> PipelineResult<PipelineReport> {
        let config = &self.config;
        let chunk_size = config.chunk_size();
        let paths = config.processed_paths();
        std::fs::create_dir_all(&config.processed_dir)
            .map_err(PipelineError::io(&config.processed_dir))?;

        info!(raw = %config.raw_dir.display(), out = %config.processed_dir.display(), "Processing movies");
        let mut source = RawSource::open(config.raw(&config.movies_file), SourceFormat::Tsv)?;
        let mut writer = RecordWriter::create(&paths.movies, WriteMode::Fresh)?;
        let (movie_ids, movies) =
            normalize_movies(&mut source, &mut writer, &config.title_type, chunk_size)?;
        writer.finish()?;
        movies.log();

        info!("Processing principals");
        let categories: FxHashSet<String> = config.categories.iter().cloned().collect();
        let mut source = RawSource::open(config.raw(&config.principals_file), SourceFormat::Tsv)?;
        let mut writer = RecordWriter::create(&paths.roles, WriteMode::Fresh)?;
        let (candidates, principals) =
            normalize_principals(&mut source, &mut writer, &movie_ids, &categories, chunk_size)?;
        writer.finish()?;
        drop(movie_ids);
        principals.log();
        info!(candidates = candidates.len(), "Candidate people linked to movies");

        info!("Processing names");
        let mut source = RawSource::open(config.raw(&config.names_file), SourceFormat::Tsv)?;
        let mut writer = RecordWriter::create(&paths.people, WriteMode::Fresh)?;
        let (resolved, names) = normalize_names(&mut source, &mut writer, &candidates, chunk_size)?;
        writer.finish()?;
        drop(candidates);
        names.log();

        info!(people = resolved.len(), "Finalizing roles (referential integrity)");
        let finalize = finalize_roles(&paths.roles, &resolved, chunk_size)?;
        finalize.log();

        Ok(PipelineReport {
            movies,
            principals,
            names,
            finalize,
        })
    }
}
