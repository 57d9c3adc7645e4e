//! Error types for the pharmload import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ReaderError`] - spreadsheet reading/decoding errors
//! - [`ImportError`] - importer errors, including the header-validation batch
//! - [`RosterError`] - user roster parsing errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::validation::ImportationError;

// =============================================================================
// Reader Errors
// =============================================================================

/// Errors while reading a spreadsheet file into a cell matrix.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// Malformed delimited content.
    #[error("Invalid spreadsheet format: {0}")]
    Parse(String),

    /// File contains no rows at all.
    #[error("Spreadsheet file is empty")]
    EmptyFile,
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors during the spreadsheet-to-relational import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reading the input failed.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Header validation failed; the batch carries every problem found
    /// so the user can fix all of them in one pass.
    #[error("Invalid header: {} error(s)", .0.len())]
    InvalidHeader(Vec<ImportationError>),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Roster Errors
// =============================================================================

/// Errors while importing a user roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Reading the roster file failed.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Roster is missing a required column.
    #[error("Roster is missing column: {0}")]
    MissingColumn(String),

    /// Roster contains no user rows.
    #[error("Roster contains no users")]
    EmptyRoster,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::import::import_file`]
/// and the CLI commands. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reader error.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Roster error.
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorCode;

    #[test]
    fn test_error_conversion_chain() {
        // ReaderError -> ImportError -> PipelineError
        let reader_err = ReaderError::EmptyFile;
        let import_err: ImportError = reader_err.into();
        let pipeline_err: PipelineError = import_err.into();
        assert!(pipeline_err.to_string().contains("empty"));
    }

    #[test]
    fn test_invalid_header_message_counts_errors() {
        let err = ImportError::InvalidHeader(vec![
            ImportationError::new(ErrorCode::MissingColumn, "missing DCI"),
            ImportationError::new(ErrorCode::InvalidColumn, "unknown column FOO"),
        ]);
        assert!(err.to_string().contains("2 error(s)"));
    }
}
