//! High-level import pipeline: spreadsheet file to normalized dataset.
//!
//! Stages, in order: read the matrix, validate the header against the
//! column schema, derive the file structure, drop rows with a blank key
//! field, build classifications and properties, assemble molecule records.
//!
//! A run either completes or fails atomically: a header-validation failure
//! returns the full error batch and no partial classification or property
//! tables are ever exposed. Rows are processed in strict original order so
//! surrogate-id assignment is reproducible across runs.

pub mod classification;
pub mod property;
pub mod records;

pub use classification::build_classification;
pub use property::build_property;
pub use records::assemble_records;

use std::path::Path;

use serde::Serialize;

use crate::error::{ImportError, ImportResult};
use crate::models::Dataset;
use crate::reader::{read_bytes_auto, read_file_auto, Cell, ReadResult};
use crate::schema::{ColumnDescriptor, FileStructure, MOLECULE_SCHEMA};
use crate::validation::check_header;

/// Metadata about one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    /// Data rows present in the file.
    pub row_count: usize,
    /// Rows dropped for a blank key field (policy, not an error).
    pub dropped_rows: usize,
}

/// Result of a complete import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub dataset: Dataset,
    pub info: ImportInfo,
}

/// Import a spreadsheet file into a normalized dataset.
///
/// The file read is the sole suspension point; everything after is a
/// synchronous, deterministic transformation.
pub async fn import_file<P: AsRef<Path>>(path: P) -> ImportResult<ImportReport> {
    let read = read_file_auto(path).await?;
    import_matrix(read, &MOLECULE_SCHEMA)
}

/// Import raw spreadsheet bytes into a normalized dataset.
pub fn import_bytes(bytes: &[u8]) -> ImportResult<ImportReport> {
    let read = read_bytes_auto(bytes)?;
    import_matrix(read, &MOLECULE_SCHEMA)
}

/// Run the synchronous pipeline on an already-read matrix.
pub fn import_matrix(read: ReadResult, schema: &[ColumnDescriptor]) -> ImportResult<ImportReport> {
    let header = read.header();
    log::info!("header: {} columns", header.len());

    let report = check_header(&header, schema);
    if !report.valid {
        for error in &report.errors {
            log::warn!("header check: {}", error);
        }
        return Err(ImportError::InvalidHeader(report.errors));
    }

    let structure = FileStructure::from_header(&header, schema);
    let row_count = read.rows().len();

    // Rows with a blank key field carry no identifiable molecule.
    let key_column = schema
        .iter()
        .find(|d| d.key)
        .and_then(|d| structure.unique_column(d.property));
    let rows: Vec<Vec<Cell>> = read
        .rows()
        .iter()
        .filter(|row| match key_column {
            Some(column) => !row.get(column).map(Cell::is_blank).unwrap_or(true),
            None => true,
        })
        .cloned()
        .collect();
    let dropped_rows = row_count - rows.len();
    if dropped_rows > 0 {
        log::debug!("dropped {} row(s) with a blank key field", dropped_rows);
    }

    let classifications: Vec<_> = schema
        .iter()
        .filter(|d| d.hierarchical)
        .map(|d| {
            build_classification(d.property, d.table, &rows, structure.columns_of(d.property))
        })
        .collect();

    let properties: Vec<_> = schema
        .iter()
        .filter(|d| d.multi_valued)
        .enumerate()
        .map(|(index, d)| {
            build_property(
                index as u32 + 1,
                d.property,
                d.table,
                &rows,
                structure.columns_of(d.property),
            )
        })
        .collect();

    let molecules = assemble_records(&rows, &structure, schema, &classifications, &properties);
    log::info!(
        "built {} classification(s), {} propert(ies), {} molecule(s)",
        classifications.len(),
        properties.len(),
        molecules.len()
    );

    Ok(ImportReport {
        dataset: Dataset {
            classifications,
            properties,
            molecules,
        },
        info: ImportInfo {
            encoding: read.encoding,
            delimiter: read.delimiter,
            headers: header,
            row_count,
            dropped_rows,
        },
    })
}
