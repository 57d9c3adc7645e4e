//! # Pharmload - spreadsheet-to-relational importer for the pharmacology quiz
//!
//! Pharmload ingests a semi-structured molecule spreadsheet (molecules,
//! their classifications, and pharmacological properties), validates its
//! header layout against a declarative column schema, builds hierarchical
//! and flat lookup tables with stable surrogate ids, and emits either a
//! normalized JSON document or an SQL insert script. It also imports user
//! rosters and runs duplicate/near-duplicate login diagnostics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Reader    │────▶│   Builders   │────▶│  JSON / SQL │
//! │ (ISO/UTF8)  │     │ (auto-enc)  │     │ (validated)  │     │  (emitted)  │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pharmload::import_file;
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = import_file("molecules.csv").await.unwrap();
//!     println!("Imported {} molecules", report.dataset.molecules.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`reader`] - Spreadsheet reading with auto-detection
//! - [`schema`] - Declarative column schema and file structure
//! - [`validation`] - Header validation and dataset schema checks
//! - [`models`] - Domain models (Classification, Property, Molecule)
//! - [`import`] - Builders and the import pipeline
//! - [`emit`] - JSON and SQL emitters
//! - [`roster`] - User roster importer/analyzer

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod reader;

// Schema and validation
pub mod schema;
pub mod validation;

// Import pipeline
pub mod import;

// Emission
pub mod emit;

// Roster diagnostics
pub mod roster;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ImportError, PipelineError, ReaderError, RosterError};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{
    decode_content, detect_delimiter, detect_encoding, read_bytes_auto, read_file_auto, Cell,
    Matrix, ReadResult,
};

// =============================================================================
// Re-exports - Schema & Validation
// =============================================================================

pub use schema::{ColumnDescriptor, ColumnPattern, FileStructure, MOLECULE_SCHEMA};
pub use validation::{
    check_header, is_valid_dataset, validate_dataset, ErrorCode, HeaderReport, ImportationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    junction_value_id, Classification, ClassificationNode, Dataset, Molecule, Property,
    PropertyValue,
};

// =============================================================================
// Re-exports - Import pipeline
// =============================================================================

pub use import::{
    assemble_records, build_classification, build_property, import_bytes, import_file,
    import_matrix, ImportInfo, ImportReport,
};

// =============================================================================
// Re-exports - Emitters
// =============================================================================

pub use emit::{dataset_to_json, dataset_to_json_string, dataset_to_sql};

// =============================================================================
// Re-exports - Roster
// =============================================================================

pub use roster::{analyze, analyze_file, parse_roster, RosterReport, User, Warning, WarningCode};
