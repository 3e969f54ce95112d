//! Streaming access to delimited tables
//!
//! Raw tables are tab-separated, unquoted and usually gzip-compressed;
//! processed tables are ordinary CSV. Either way rows are handed out in
//! bounded chunks of raw byte records so stages never hold a whole table.

use super::{MalformedRecord, PipelineError, PipelineResult};
use csv::{ByteRecord, ReaderBuilder};
use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Physical layout of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Tab-separated, quote characters are literal
    Tsv,
    /// Comma-separated with standard quoting
    Csv,
}

/// A bounded slice of a table
#[derive(Debug, Default)]
pub struct Chunk {
    pub records: Vec<ByteRecord>,
    /// Rows in this slice that could not even be split into fields
    pub malformed: u64,
}

impl Chunk {
    /// Rows consumed from the source, malformed included
    pub fn rows(&self) -> u64 {
        self.records.len() as u64 + self.malformed
    }
}

/// A table opened for streaming
pub struct RawSource {
    path: PathBuf,
    reader: csv::Reader<Box<dyn Read + Send>>,
    headers: ByteRecord,
    exhausted: bool,
}

impl RawSource {
    /// Open a table and read its header row
    ///
    /// Files ending in `.gz` are decompressed on the fly. A file that cannot be
    /// opened or whose header cannot be read is `SourceUnreadable`.
    pub fn open(path: impl AsRef<Path>, format: SourceFormat) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| PipelineError::SourceUnreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let input: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let mut builder = ReaderBuilder::new();
        builder.has_headers(true).flexible(false);
        match format {
            SourceFormat::Tsv => {
                builder.delimiter(b'\t').quoting(false);
            }
            SourceFormat::Csv => {
                builder.delimiter(b',');
            }
        }
        let mut reader = builder.from_reader(input);

        let headers = reader
            .byte_headers()
            .map_err(|e| PipelineError::SourceUnreadable {
                path: path.clone(),
                reason: e.to_string(),
            })?
            .clone();

        Ok(Self {
            path,
            reader,
            headers,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &ByteRecord {
        &self.headers
    }

    /// Position of a required column; its absence is fatal for the stage
    pub fn column(&self, name: &str) -> PipelineResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name.as_bytes())
            .ok_or_else(|| PipelineError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Read up to `chunk_size` rows
    ///
    /// Rows with the wrong number of fields are counted as malformed and
    /// skipped; an I/O failure (including corrupt compression) is fatal.
    /// Returns `None` once the table is exhausted.
    pub fn next_chunk(&mut self, chunk_size: usize) -> PipelineResult<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut chunk = Chunk {
            records: Vec::with_capacity(chunk_size.min(1 << 16)),
            malformed: 0,
        };
        while (chunk.rows() as usize) < chunk_size {
            let mut record = ByteRecord::new();
            match self.reader.read_byte_record(&mut record) {
                Ok(true) => chunk.records.push(record),
                Ok(false) => {
                    self.exhausted = true;
                    break;
                }
                Err(e) => match e.kind() {
                    csv::ErrorKind::Io(_) => {
                        return Err(PipelineError::SourceUnreadable {
                            path: self.path.clone(),
                            reason: e.to_string(),
                        })
                    }
                    csv::ErrorKind::UnequalLengths {
                        expected_len, len, ..
                    } => {
                        let row = MalformedRecord::FieldCount {
                            expected: *expected_len,
                            found: *len,
                        };
                        debug!(path = %self.path.display(), error = %row, "Skipping malformed row");
                        chunk.malformed += 1;
                    }
                    _ => {
                        debug!(path = %self.path.display(), error = %e, "Skipping malformed row");
                        chunk.malformed += 1;
                    }
                },
            }
        }

        if chunk.rows() == 0 {
            return Ok(None);
        }
        Ok(Some(chunk))
    }
}

/// Decode a processed-table row into its record type, matching columns by name
pub(crate) fn decode<T: DeserializeOwned>(
    record: &ByteRecord,
    headers: &ByteRecord,
) -> Result<T, MalformedRecord> {
    record
        .deserialize(Some(headers))
        .map_err(|e| MalformedRecord::Schema(e.to_string()))
}

/// Borrow field `idx` of a raw row as UTF-8
pub(crate) fn field<'r>(
    record: &'r ByteRecord,
    idx: usize,
    column: &'static str,
) -> Result<&'r str, MalformedRecord> {
    let raw = record.get(idx).ok_or(MalformedRecord::MissingField(column))?;
    std::str::from_utf8(raw).map_err(|_| MalformedRecord::InvalidUtf8(column))
}

/// Like [`field`], but rejects empty values and the `\N` missing marker
pub(crate) fn required<'r>(
    record: &'r ByteRecord,
    idx: usize,
    column: &'static str,
) -> Result<&'r str, MalformedRecord> {
    let value = field(record, idx, column)?;
    if value.is_empty() || value == MISSING {
        return Err(MalformedRecord::EmptyField(column));
    }
    Ok(value)
}

/// Missing-value marker used by the raw tables
pub const MISSING: &str = "\\N";

/// Normalize an optional year: `\N` or empty means absent
pub(crate) fn optional_year(value: &str, column: &'static str) -> Result<Option<i32>, MalformedRecord> {
    if value.is_empty() || value == MISSING {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| MalformedRecord::InvalidValue {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_tsv_chunks() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.tsv", "a\tb\n1\t\"x\n2\ty\n3\tz\n");
        let mut source = RawSource::open(&path, SourceFormat::Tsv).unwrap();
        assert_eq!(source.column("b").unwrap(), 1);

        let first = source.next_chunk(2).unwrap().unwrap();
        assert_eq!(first.records.len(), 2);
        // Quotes are literal in raw tables
        assert_eq!(&first.records[0][1], b"\"x");

        let second = source.next_chunk(2).unwrap().unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(source.next_chunk(2).unwrap().is_none());
    }

    #[test]
    fn test_malformed_rows_are_counted() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.tsv", "a\tb\n1\t2\nbroken\n3\t4\n");
        let mut source = RawSource::open(&path, SourceFormat::Tsv).unwrap();
        let chunk = source.next_chunk(10).unwrap().unwrap();
        assert_eq!(chunk.records.len(), 2);
        assert_eq!(chunk.malformed, 1);
        assert_eq!(chunk.rows(), 3);
    }

    #[test]
    fn test_gzip_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"id\tname\nnm1\tAlice\n").unwrap();
        encoder.finish().unwrap();

        let mut source = RawSource::open(&path, SourceFormat::Tsv).unwrap();
        let chunk = source.next_chunk(10).unwrap().unwrap();
        assert_eq!(field(&chunk.records[0], 1, "name").unwrap(), "Alice");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let result = RawSource::open(dir.path().join("absent.tsv"), SourceFormat::Tsv);
        assert!(matches!(result, Err(PipelineError::SourceUnreadable { .. })));
    }

    #[test]
    fn test_corrupt_gzip_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.tsv.gz", "this is not gzip at all");
        let result = RawSource::open(&path, SourceFormat::Tsv)
            .and_then(|mut s| s.next_chunk(10).map(|_| ()));
        assert!(matches!(result, Err(PipelineError::SourceUnreadable { .. })));
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.tsv", "a\tb\n");
        let source = RawSource::open(&path, SourceFormat::Tsv).unwrap();
        assert!(matches!(
            source.column("tconst"),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_optional_year() {
        assert_eq!(optional_year("\\N", "startYear"), Ok(None));
        assert_eq!(optional_year("", "startYear"), Ok(None));
        assert_eq!(optional_year("1994", "startYear"), Ok(Some(1994)));
        assert!(optional_year("19x4", "startYear").is_err());
    }

    #[test]
    fn test_required_rejects_missing_marker() {
        let record = ByteRecord::from(vec!["nm1", "\\N"]);
        assert_eq!(required(&record, 0, "nconst"), Ok("nm1"));
        assert_eq!(
            required(&record, 1, "primaryName"),
            Err(MalformedRecord::EmptyField("primaryName"))
        );
        assert_eq!(
            required(&record, 5, "birthYear"),
            Err(MalformedRecord::MissingField("birthYear"))
        );
    }
}
