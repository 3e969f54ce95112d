//! Record normalizer
//!
//! Each stage reads its raw table chunk by chunk, parses and filters the rows
//! of a chunk in parallel, then writes the survivors in source order. Parsing
//! is pure; identifier bookkeeping (dedup, candidate sets) happens on the
//! writing side so it stays deterministic.

use super::source::{field, optional_year, required, RawSource};
use super::writer::RecordWriter;
use super::{MalformedRecord, PipelineResult, StageReport};
use crate::graph::{Category, Movie, ParticipationEdge, Person};
use csv::ByteRecord;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Identifiers retained by a stage
pub type IdSet = FxHashSet<String>;

/// Stream `source`, parsing rows in parallel and handing each kept record to
/// `accept` in source order
pub(crate) fn drive<T, P, A>(
    source: &mut RawSource,
    chunk_size: usize,
    report: &mut StageReport,
    parse: P,
    mut accept: A,
) -> PipelineResult<()>
where
    T: Send,
    P: Fn(&ByteRecord) -> Result<Option<T>, MalformedRecord> + Sync,
    A: FnMut(T, &mut StageReport) -> PipelineResult<()>,
{
    let mut chunks = 0u64;
    while let Some(chunk) = source.next_chunk(chunk_size)? {
        chunks += 1;
        report.rows_read += chunk.rows();
        report.malformed += chunk.malformed;

        let parsed: Vec<_> = chunk.records.par_iter().map(&parse).collect();
        for row in parsed {
            match row {
                Ok(Some(record)) => accept(record, report)?,
                Ok(None) => report.filtered += 1,
                Err(e) => {
                    debug!(stage = report.stage, error = %e, "Skipping malformed row");
                    report.malformed += 1;
                }
            }
        }

        debug!(
            stage = report.stage,
            chunk = chunks,
            rows_read = report.rows_read,
            kept = report.kept,
            "Chunk processed"
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct MovieColumns {
    id: usize,
    title_type: usize,
    title: usize,
    year: usize,
}

fn parse_movie(
    record: &ByteRecord,
    cols: MovieColumns,
    title_type: &str,
) -> Result<Option<Movie>, MalformedRecord> {
    if field(record, cols.title_type, "titleType")? != title_type {
        return Ok(None);
    }
    let id = required(record, cols.id, "tconst")?;
    let title = required(record, cols.title, "primaryTitle")?;
    let year = optional_year(field(record, cols.year, "startYear")?, "startYear")?;
    Ok(Some(Movie::new(id, title, year)))
}

/// Stage 1: keep titles of `title_type`, returning the retained movie ids
pub fn normalize_movies(
    source: &mut RawSource,
    writer: &mut RecordWriter<Movie>,
    title_type: &str,
    chunk_size: usize,
) -> PipelineResult<(IdSet, StageReport)> {
    let cols = MovieColumns {
        id: source.column("tconst")?,
        title_type: source.column("titleType")?,
        title: source.column("primaryTitle")?,
        year: source.column("startYear")?,
    };

    let mut report = StageReport::new("movies");
    let mut ids = IdSet::default();
    drive(
        source,
        chunk_size,
        &mut report,
        |record| parse_movie(record, cols, title_type),
        |movie, report| {
            if ids.contains(&movie.id) {
                report.duplicates += 1;
                return Ok(());
            }
            writer.write(&movie)?;
            ids.insert(movie.id);
            report.kept += 1;
            Ok(())
        },
    )?;
    Ok((ids, report))
}

#[derive(Debug, Clone, Copy)]
struct RoleColumns {
    movie: usize,
    person: usize,
    category: usize,
}

fn parse_role(
    record: &ByteRecord,
    cols: RoleColumns,
    movie_ids: &IdSet,
    categories: &FxHashSet<String>,
) -> Result<Option<ParticipationEdge>, MalformedRecord> {
    let movie = required(record, cols.movie, "tconst")?;
    if !movie_ids.contains(movie) {
        return Ok(None);
    }
    let category = field(record, cols.category, "category")?;
    if !categories.contains(category) {
        return Ok(None);
    }
    let person = required(record, cols.person, "nconst")?;
    Ok(Some(ParticipationEdge::new(person, movie, category)))
}

/// Stage 2: keep participations in retained movies with a retained category
///
/// Returns the *candidate* people: every person id seen on a kept row. The
/// principals table lists one movie's rows together, so repeated
/// (person, category) pairs are only tracked within the current movie.
pub fn normalize_principals(
    source: &mut RawSource,
    writer: &mut RecordWriter<ParticipationEdge>,
    movie_ids: &IdSet,
    categories: &FxHashSet<String>,
    chunk_size: usize,
) -> PipelineResult<(IdSet, StageReport)> {
    let cols = RoleColumns {
        movie: source.column("tconst")?,
        person: source.column("nconst")?,
        category: source.column("category")?,
    };

    let mut report = StageReport::new("principals");
    let mut candidates = IdSet::default();
    let mut block_movie = String::new();
    let mut block_seen: FxHashSet<(String, Category)> = FxHashSet::default();

    drive(
        source,
        chunk_size,
        &mut report,
        |record| parse_role(record, cols, movie_ids, categories),
        |edge, report| {
            if edge.movie_id != block_movie {
                block_movie.clone_from(&edge.movie_id);
                block_seen.clear();
            }
            if !block_seen.insert((edge.person_id.clone(), edge.category.clone())) {
                report.duplicates += 1;
                return Ok(());
            }
            writer.write(&edge)?;
            if !candidates.contains(&edge.person_id) {
                candidates.insert(edge.person_id);
            }
            report.kept += 1;
            Ok(())
        },
    )?;
    Ok((candidates, report))
}

#[derive(Debug, Clone, Copy)]
struct NameColumns {
    id: usize,
    name: usize,
    birth_year: usize,
}

fn parse_person(
    record: &ByteRecord,
    cols: NameColumns,
    candidates: &IdSet,
) -> Result<Option<Person>, MalformedRecord> {
    let id = required(record, cols.id, "nconst")?;
    if !candidates.contains(id) {
        return Ok(None);
    }
    let name = required(record, cols.name, "primaryName")?;
    let born = optional_year(field(record, cols.birth_year, "birthYear")?, "birthYear")?;
    Ok(Some(Person::new(id, name, born)))
}

/// Stage 3: keep people among the candidates, returning the *resolved* ids
pub fn normalize_names(
    source: &mut RawSource,
    writer: &mut RecordWriter<Person>,
    candidates: &IdSet,
    chunk_size: usize,
) -> PipelineResult<(IdSet, StageReport)> {
    let cols = NameColumns {
        id: source.column("nconst")?,
        name: source.column("primaryName")?,
        birth_year: source.column("birthYear")?,
    };

    let mut report = StageReport::new("names");
    let mut resolved = IdSet::default();
    drive(
        source,
        chunk_size,
        &mut report,
        |record| parse_person(record, cols, candidates),
        |person, report| {
            if resolved.contains(&person.id) {
                report.duplicates += 1;
                return Ok(());
            }
            writer.write(&person)?;
            resolved.insert(person.id);
            report.kept += 1;
            Ok(())
        },
    )?;
    Ok((resolved, report))
}
