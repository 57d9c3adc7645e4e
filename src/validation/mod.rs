//! Header validation against the declarative column schema.
//!
//! A single stateless call, [`check_header`], takes the header row and the
//! schema and returns a verdict plus the full list of structured errors.
//! Checks never short-circuit: every problem is collected so a user can fix
//! the whole spreadsheet in one pass.
//!
//! # Checks
//!
//! 1. every schema descriptor matches at least one header cell (`MISSING_COLUMN`)
//! 2. every header cell matches at least one descriptor (`INVALID_COLUMN`)
//! 3. unique column titles never repeat (`DUPLICATE_UNIQUE_COLUMN`)
//! 4. same-property columns are contiguous
//! 5. hierarchical level suffixes run 1, 2, 3... left to right
//!
//! Grouping and level-order violations are reported with the
//! `INVALID_COLUMN` code and a message naming the offending column.
//!
//! This module also validates emitted datasets against an embedded JSON
//! Schema (Draft 7), see [`validate_dataset`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{descriptor_for, ColumnDescriptor};

// =============================================================================
// Importation Errors
// =============================================================================

/// Structured error code for header validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingColumn,
    DuplicateUniqueColumn,
    EmptyFile,
    InvalidColumn,
}

/// One structured header-validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportationError {
    pub code: ErrorCode,
    pub message: String,
}

impl ImportationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ImportationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

/// Verdict of a header validation run.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderReport {
    pub valid: bool,
    pub errors: Vec<ImportationError>,
}

impl HeaderReport {
    fn from_errors(errors: Vec<ImportationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

// =============================================================================
// Header Checker
// =============================================================================

/// Validate a header row against the column schema.
///
/// Stateless: no init step, no cross-call contamination. The verdict is
/// valid iff zero errors accumulated.
pub fn check_header(header: &[String], schema: &[ColumnDescriptor]) -> HeaderReport {
    if header.iter().all(|cell| cell.trim().is_empty()) {
        return HeaderReport::from_errors(vec![ImportationError::new(
            ErrorCode::EmptyFile,
            "header row is empty",
        )]);
    }

    let mut errors = Vec::new();

    check_missing_columns(header, schema, &mut errors);
    check_invalid_columns(header, schema, &mut errors);
    check_duplicate_unique_columns(header, schema, &mut errors);
    check_grouping(header, schema, &mut errors);
    check_hierarchy_order(header, schema, &mut errors);

    HeaderReport::from_errors(errors)
}

/// Check 1: every descriptor has at least one matching header cell.
fn check_missing_columns(
    header: &[String],
    schema: &[ColumnDescriptor],
    errors: &mut Vec<ImportationError>,
) {
    for descriptor in schema {
        if !header.iter().any(|cell| descriptor.pattern.matches(cell)) {
            errors.push(ImportationError::new(
                ErrorCode::MissingColumn,
                format!("no column found for property '{}'", descriptor.property),
            ));
        }
    }
}

/// Check 2: every header cell is recognized by the schema.
fn check_invalid_columns(
    header: &[String],
    schema: &[ColumnDescriptor],
    errors: &mut Vec<ImportationError>,
) {
    for cell in header {
        if descriptor_for(schema, cell).is_none() {
            errors.push(ImportationError::new(
                ErrorCode::InvalidColumn,
                format!("unrecognized column '{}'", cell.trim()),
            ));
        }
    }
}

/// Check 3: unique column titles may not repeat (exact text).
fn check_duplicate_unique_columns(
    header: &[String],
    schema: &[ColumnDescriptor],
    errors: &mut Vec<ImportationError>,
) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cell in header {
        *counts.entry(cell.trim()).or_default() += 1;
    }

    for descriptor in schema.iter().filter(|d| d.unique) {
        for (title, count) in &counts {
            if *count > 1 && descriptor.pattern.matches(title) {
                errors.push(ImportationError::new(
                    ErrorCode::DuplicateUniqueColumn,
                    format!("unique column '{}' appears {} times", title, count),
                ));
            }
        }
    }
}

/// Check 4: columns of the same property must be contiguous.
///
/// A break followed by a return to an already-seen group is an error.
fn check_grouping(
    header: &[String],
    schema: &[ColumnDescriptor],
    errors: &mut Vec<ImportationError>,
) {
    let mut closed: BTreeSet<&str> = BTreeSet::new();
    let mut current: Option<&str> = None;

    for cell in header {
        let Some(descriptor) = descriptor_for(schema, cell) else {
            // Unrecognized cells are already reported by check 2; they
            // still break the current group.
            if let Some(prev) = current.take() {
                closed.insert(prev);
            }
            continue;
        };

        if current == Some(descriptor.property) {
            continue;
        }
        if let Some(prev) = current.take() {
            closed.insert(prev);
        }
        if closed.contains(descriptor.property) {
            errors.push(ImportationError::new(
                ErrorCode::InvalidColumn,
                format!(
                    "columns for property '{}' are not contiguous (found '{}' after the group ended)",
                    descriptor.property,
                    cell.trim()
                ),
            ));
        }
        current = Some(descriptor.property);
    }
}

/// Check 5: hierarchical level suffixes must run 1, 2, 3... left to right.
///
/// A deviation is reported and tracking continues from the observed level.
fn check_hierarchy_order(
    header: &[String],
    schema: &[ColumnDescriptor],
    errors: &mut Vec<ImportationError>,
) {
    let mut expected: BTreeMap<&str, u32> = BTreeMap::new();

    for cell in header {
        let Some(descriptor) = descriptor_for(schema, cell) else {
            continue;
        };
        if !descriptor.hierarchical {
            continue;
        }
        let Some(level) = descriptor.pattern.capture_level(cell) else {
            continue;
        };

        let next = expected.entry(descriptor.property).or_insert(1);
        if level != *next {
            errors.push(ImportationError::new(
                ErrorCode::InvalidColumn,
                format!(
                    "column '{}' is out of order: expected level {} for property '{}'",
                    cell.trim(),
                    next,
                    descriptor.property
                ),
            ));
        }
        *next = level + 1;
    }
}

// =============================================================================
// Dataset schema validation
// =============================================================================

/// Validate an emitted dataset document against the embedded JSON Schema.
pub fn validate_dataset(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/dataset.json"))
        .expect("Invalid embedded schema");
    validate(&schema, data)
}

/// Quick check against the embedded dataset schema.
pub fn is_valid_dataset(data: &Value) -> bool {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/dataset.json"))
        .expect("Invalid embedded schema");
    jsonschema::draft7::is_valid(&schema, data)
}

/// Validate a JSON object against a JSON Schema (Draft 7).
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MOLECULE_SCHEMA;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    /// Fully valid reference header used across tests.
    fn valid_header() -> Vec<String> {
        header(&[
            "DCI",
            "MTE",
            "FORMULE_CHIMIQUE",
            "NIVEAU_DEBUTANT",
            "NIVEAU_EXPERT",
            "CLASSE_1",
            "CLASSE_2",
            "SYSTEME_1",
            "SYSTEME_2",
            "SYSTEME_3",
            "INDICATION",
            "INDICATION",
            "INTERACTION",
            "EFFET_INDESIRABLE",
        ])
    }

    #[test]
    fn test_valid_header_passes() {
        let report = check_header(&valid_header(), &MOLECULE_SCHEMA);
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_missing_column_reported_once_per_descriptor() {
        let mut cells = valid_header();
        cells.retain(|c| c != "MTE" && c != "INTERACTION");
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        assert!(!report.valid);
        let missing: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.code == ErrorCode::MissingColumn)
            .collect();
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn test_unrecognized_column() {
        let mut cells = valid_header();
        cells.push("COULEUR".to_string());
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        let invalid: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.code == ErrorCode::InvalidColumn)
            .collect();
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].message.contains("COULEUR"));
    }

    #[test]
    fn test_duplicate_unique_column() {
        let mut cells = valid_header();
        cells.push("DCI".to_string());
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.code == ErrorCode::DuplicateUniqueColumn));
    }

    #[test]
    fn test_duplicate_multi_valued_column_allowed() {
        // INDICATION appears twice in the reference header and that is fine.
        let report = check_header(&valid_header(), &MOLECULE_SCHEMA);
        assert!(!report
            .errors
            .iter()
            .any(|e| e.code == ErrorCode::DuplicateUniqueColumn));
    }

    #[test]
    fn test_non_contiguous_group() {
        let cells = header(&[
            "DCI",
            "MTE",
            "FORMULE_CHIMIQUE",
            "NIVEAU_DEBUTANT",
            "NIVEAU_EXPERT",
            "CLASSE_1",
            "SYSTEME_1",
            "CLASSE_2",
            "INDICATION",
            "INTERACTION",
            "EFFET_INDESIRABLE",
        ]);
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.message.contains("not contiguous")));
    }

    #[test]
    fn test_hierarchy_out_of_order() {
        let cells = header(&[
            "DCI",
            "MTE",
            "FORMULE_CHIMIQUE",
            "NIVEAU_DEBUTANT",
            "NIVEAU_EXPERT",
            "CLASSE_1",
            "CLASSE_2",
            "SYSTEME_2",
            "SYSTEME_1",
            "INDICATION",
            "INTERACTION",
            "EFFET_INDESIRABLE",
        ]);
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.message.contains("out of order")));
    }

    #[test]
    fn test_hierarchy_skipped_level() {
        let cells = header(&[
            "DCI",
            "MTE",
            "FORMULE_CHIMIQUE",
            "NIVEAU_DEBUTANT",
            "NIVEAU_EXPERT",
            "CLASSE_1",
            "CLASSE_3",
            "SYSTEME_1",
            "INDICATION",
            "INTERACTION",
            "EFFET_INDESIRABLE",
        ]);
        let report = check_header(&cells, &MOLECULE_SCHEMA);
        assert!(!report.valid);
    }

    #[test]
    fn test_empty_header() {
        let report = check_header(&header(&["", ""]), &MOLECULE_SCHEMA);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, ErrorCode::EmptyFile);
    }

    #[test]
    fn test_errors_accumulate_across_checks() {
        // Missing MTE, one unknown column, duplicated DCI: three distinct codes.
        let cells = header(&[
            "DCI",
            "DCI",
            "FORMULE_CHIMIQUE",
            "NIVEAU_DEBUTANT",
            "NIVEAU_EXPERT",
            "CLASSE_1",
            "SYSTEME_1",
            "INDICATION",
            "INTERACTION",
            "EFFET_INDESIRABLE",
            "COULEUR",
        ]);
        let report = check_header(&cells, &MOLECULE_SCHEMA);

        let codes: std::collections::BTreeSet<_> =
            report.errors.iter().map(|e| format!("{:?}", e.code)).collect();
        assert!(codes.contains("MissingColumn"));
        assert!(codes.contains("DuplicateUniqueColumn"));
        assert!(codes.contains("InvalidColumn"));
    }

    #[test]
    fn test_error_code_serialization() {
        let err = ImportationError::new(ErrorCode::MissingColumn, "x");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_COLUMN");
    }

    #[test]
    fn test_generic_schema_validation() {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["molecules"],
            "properties": { "molecules": { "type": "array" } }
        });
        assert!(validate(&schema, &serde_json::json!({ "molecules": [] })).is_ok());
        assert!(validate(&schema, &serde_json::json!({})).is_err());
    }
}
