//! Processed table writers
//!
//! Every processed file starts with a header naming its columns, followed by
//! one CSV row per record. The column list is carried by the record type so
//! writers and readers agree on it.

use super::{PipelineError, PipelineResult};
use crate::graph::{Movie, ParticipationEdge, Person};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A record that is stored as one row of a processed table
pub trait TabularRecord: Serialize {
    /// Header row, in serialization order
    const COLUMNS: &'static [&'static str];
}

impl TabularRecord for Movie {
    const COLUMNS: &'static [&'static str] = &["tconst", "primaryTitle", "startYear"];
}

impl TabularRecord for Person {
    const COLUMNS: &'static [&'static str] = &["nconst", "primaryName", "birthYear"];
}

impl TabularRecord for ParticipationEdge {
    const COLUMNS: &'static [&'static str] = &["tconst", "nconst", "category"];
}

/// How an existing output file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate (or create) and write the header
    Fresh,
    /// Add rows to an existing file that already has its header
    Append,
}

/// Streams records of one type into a processed table
pub struct RecordWriter<T: TabularRecord> {
    path: PathBuf,
    inner: csv::Writer<BufWriter<File>>,
    rows: u64,
    _record: PhantomData<fn(&T)>,
}

impl<T: TabularRecord> RecordWriter<T> {
    pub fn create(path: impl AsRef<Path>, mode: WriteMode) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            WriteMode::Fresh => File::create(&path),
            WriteMode::Append => OpenOptions::new().append(true).open(&path),
        }
        .map_err(PipelineError::io(&path))?;

        let mut inner = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if mode == WriteMode::Fresh {
            inner
                .write_record(T::COLUMNS)
                .map_err(PipelineError::csv(&path))?;
        }

        Ok(Self {
            path,
            inner,
            rows: 0,
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, record: &T) -> PipelineResult<()> {
        self.inner
            .serialize(record)
            .map_err(PipelineError::csv(&self.path))?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_chunk<'a, I>(&mut self, records: I) -> PipelineResult<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Flush to disk; returns the number of rows written by this writer
    pub fn finish(mut self) -> PipelineResult<u64> {
        self.inner.flush().map_err(PipelineError::io(&self.path))?;
        Ok(self.rows)
    }
}
