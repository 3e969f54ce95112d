//! Bulk-import export
//!
//! Produces the node/relationship files an offline graph importer consumes:
//! each processed file copied without its header, plus a one-line header file
//! declaring the role of every column. The header tokens and column order are
//! a compatibility contract with the importer.

use super::{PipelineError, PipelineResult};
use crate::graph::PARTICIPATION_EDGE_TYPE;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// One importable table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFile {
    /// Processed file the rows come from
    pub source: &'static str,
    /// Headerless data file written to the import directory
    pub data: &'static str,
    /// Header file written to the import directory
    pub header: &'static str,
    /// Contents of the header file
    pub columns: &'static str,
}

/// Movies, people and roles, in import order
pub const IMPORT_FILES: [ImportFile; 3] = [
    ImportFile {
        source: "clean_movies.csv",
        data: "movies.csv",
        header: "movies_header.csv",
        columns: "tconst:ID(Movie),title,year:int",
    },
    ImportFile {
        source: "clean_people.csv",
        data: "people.csv",
        header: "people_header.csv",
        columns: "nconst:ID(Person),name,born:int",
    },
    // Roles rows are (tconst, nconst, category): the movie is the end node
    ImportFile {
        source: "clean_roles.csv",
        data: "roles.csv",
        header: "roles_header.csv",
        columns: ":END_ID(Movie),:START_ID(Person),category",
    },
];

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub import_dir: PathBuf,
    /// (data file, bytes copied)
    pub files: Vec<(String, u64)>,
    /// Relationship type the importer should assign to role rows
    pub relationship_type: &'static str,
}

fn copy_without_header(source: &Path, target: &Path) -> PipelineResult<u64> {
    let input = File::open(source).map_err(|e| PipelineError::SourceUnreadable {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut reader = BufReader::new(input);
    let mut header = Vec::new();
    reader
        .read_until(b'\n', &mut header)
        .map_err(PipelineError::io(source))?;

    let mut writer = BufWriter::new(File::create(target).map_err(PipelineError::io(target))?);
    let copied = io::copy(&mut reader, &mut writer).map_err(PipelineError::io(target))?;
    writer.flush().map_err(PipelineError::io(target))?;
    Ok(copied)
}

/// Write the import files for the processed tables in `processed_dir`
pub fn prepare_import(processed_dir: &Path, import_dir: &Path) -> PipelineResult<ImportReport> {
    std::fs::create_dir_all(import_dir).map_err(PipelineError::io(import_dir))?;

    let mut files = Vec::with_capacity(IMPORT_FILES.len());
    for file in IMPORT_FILES {
        let data = import_dir.join(file.data);
        let bytes = copy_without_header(&processed_dir.join(file.source), &data)?;

        let header = import_dir.join(file.header);
        std::fs::write(&header, format!("{}\n", file.columns)).map_err(PipelineError::io(&header))?;

        info!(file = file.data, bytes, "Prepared import file");
        files.push((file.data.to_string(), bytes));
    }

    Ok(ImportReport {
        import_dir: import_dir.to_path_buf(),
        files,
        relationship_type: PARTICIPATION_EDGE_TYPE,
    })
}
