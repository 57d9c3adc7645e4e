//! Declarative column schema for the molecule spreadsheet.
//!
//! The schema is a fixed table mapping column-title patterns to property
//! descriptors with three orthogonal traits:
//!
//! - **unique**: one scalar value per record (e.g. `DCI`)
//! - **multi-valued**: a set of references to a flat property (e.g. `INTERACTION`)
//! - **hierarchical**: a leveled classification path, one column per level
//!   (e.g. `SYSTEME_1`, `SYSTEME_2`, ...)
//!
//! Patterns are kept as an explicit abstraction ([`ColumnPattern`]) so the
//! schema stays declarative and testable independently of the regex engine.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Column Pattern
// =============================================================================

/// A column-title pattern; hierarchical patterns embed one capture group
/// for the level number.
#[derive(Debug, Clone)]
pub struct ColumnPattern {
    regex: Regex,
}

impl ColumnPattern {
    /// Build a pattern from a regex source. The whole header cell must match.
    pub fn new(pattern: &str) -> Self {
        let anchored = format!("^{}$", pattern);
        Self {
            // Patterns are schema constants; a bad one is a programming error.
            regex: Regex::new(&anchored).unwrap_or_else(|e| {
                panic!("invalid column pattern '{}': {}", pattern, e)
            }),
        }
    }

    /// Whether a header cell matches this pattern.
    pub fn matches(&self, header_cell: &str) -> bool {
        self.regex.is_match(header_cell.trim())
    }

    /// Level number captured from a hierarchical column title, if any.
    pub fn capture_level(&self, header_cell: &str) -> Option<u32> {
        self.regex
            .captures(header_cell.trim())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

// =============================================================================
// Column Descriptor
// =============================================================================

/// One declared column family of the spreadsheet.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Title pattern matched against header cells.
    pub pattern: ColumnPattern,
    /// Property name used as key in records and emitted documents.
    pub property: &'static str,
    /// Relational table name for SQL emission.
    pub table: &'static str,
    /// Exactly one value per record, carried verbatim.
    pub unique: bool,
    /// Set of references into a flat property value list.
    pub multi_valued: bool,
    /// Leveled classification path spanning several columns.
    pub hierarchical: bool,
    /// Designated business key; records with a blank key are dropped.
    pub key: bool,
}

impl ColumnDescriptor {
    fn unique(pattern: &str, property: &'static str, table: &'static str) -> Self {
        Self {
            pattern: ColumnPattern::new(pattern),
            property,
            table,
            unique: true,
            multi_valued: false,
            hierarchical: false,
            key: false,
        }
    }

    fn multi(pattern: &str, property: &'static str, table: &'static str) -> Self {
        Self {
            pattern: ColumnPattern::new(pattern),
            property,
            table,
            unique: false,
            multi_valued: true,
            hierarchical: false,
            key: false,
        }
    }

    fn hierarchy(pattern: &str, property: &'static str, table: &'static str) -> Self {
        Self {
            pattern: ColumnPattern::new(pattern),
            property,
            table,
            unique: false,
            multi_valued: false,
            hierarchical: true,
            key: false,
        }
    }

    fn as_key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// The fixed molecule spreadsheet schema.
///
/// Declared ahead of time; columns are never inferred from the input.
pub static MOLECULE_SCHEMA: Lazy<Vec<ColumnDescriptor>> = Lazy::new(|| {
    vec![
        ColumnDescriptor::unique("DCI", "dci", "molecule").as_key(),
        ColumnDescriptor::unique("MTE", "mte", "molecule"),
        ColumnDescriptor::unique("FORMULE_CHIMIQUE", "formule_chimique", "molecule"),
        ColumnDescriptor::unique("NIVEAU_DEBUTANT", "niveau_debutant", "molecule"),
        ColumnDescriptor::unique("NIVEAU_EXPERT", "niveau_expert", "molecule"),
        ColumnDescriptor::hierarchy(r"CLASSE_(\d+)", "classes", "class"),
        ColumnDescriptor::hierarchy(r"SYSTEME_(\d+)", "systems", "system"),
        ColumnDescriptor::multi("INDICATION", "indications", "indication"),
        ColumnDescriptor::multi("INTERACTION", "interactions", "interaction"),
        ColumnDescriptor::multi("EFFET_INDESIRABLE", "side_effects", "side_effect"),
    ]
});

/// Find the descriptor whose pattern matches a header cell.
pub fn descriptor_for<'a>(
    schema: &'a [ColumnDescriptor],
    header_cell: &str,
) -> Option<&'a ColumnDescriptor> {
    schema.iter().find(|d| d.pattern.matches(header_cell))
}

// =============================================================================
// File Structure
// =============================================================================

/// Mapping from property name to the header column indexes that carry it,
/// in left-to-right order.
///
/// Pure function of a validated header; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FileStructure {
    columns: BTreeMap<String, Vec<usize>>,
}

impl FileStructure {
    /// Derive the structure from a validated header.
    pub fn from_header(header: &[String], schema: &[ColumnDescriptor]) -> Self {
        let mut columns: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (index, cell) in header.iter().enumerate() {
            if let Some(descriptor) = descriptor_for(schema, cell) {
                columns
                    .entry(descriptor.property.to_string())
                    .or_default()
                    .push(index);
            }
        }

        Self { columns }
    }

    /// Column indexes carrying the given property, left to right.
    pub fn columns_of(&self, property: &str) -> &[usize] {
        self.columns
            .get(property)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Sole column index of a unique property, if present in the header.
    pub fn unique_column(&self, property: &str) -> Option<usize> {
        self.columns_of(property).first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matching() {
        let pattern = ColumnPattern::new(r"SYSTEME_(\d+)");
        assert!(pattern.matches("SYSTEME_1"));
        assert!(pattern.matches(" SYSTEME_12 "));
        assert!(!pattern.matches("SYSTEME"));
        assert!(!pattern.matches("SOUS_SYSTEME_1"));
    }

    #[test]
    fn test_pattern_level_capture() {
        let pattern = ColumnPattern::new(r"CLASSE_(\d+)");
        assert_eq!(pattern.capture_level("CLASSE_3"), Some(3));
        assert_eq!(pattern.capture_level("CLASSE_X"), None);

        let flat = ColumnPattern::new("DCI");
        assert_eq!(flat.capture_level("DCI"), None);
    }

    #[test]
    fn test_schema_traits_are_exclusive() {
        for descriptor in MOLECULE_SCHEMA.iter() {
            let traits = [descriptor.unique, descriptor.multi_valued, descriptor.hierarchical];
            assert_eq!(
                traits.iter().filter(|t| **t).count(),
                1,
                "descriptor {} must carry exactly one trait",
                descriptor.property
            );
        }
    }

    #[test]
    fn test_schema_has_single_key() {
        let keys: Vec<_> = MOLECULE_SCHEMA.iter().filter(|d| d.key).collect();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].property, "dci");
    }

    #[test]
    fn test_descriptor_lookup() {
        let descriptor = descriptor_for(&MOLECULE_SCHEMA, "SYSTEME_2").unwrap();
        assert_eq!(descriptor.property, "systems");
        assert!(descriptor.hierarchical);
        assert!(descriptor_for(&MOLECULE_SCHEMA, "UNKNOWN").is_none());
    }

    #[test]
    fn test_file_structure() {
        let header: Vec<String> = ["SYSTEME_1", "SYSTEME_2", "DCI", "INTERACTION"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let structure = FileStructure::from_header(&header, &MOLECULE_SCHEMA);

        assert_eq!(structure.columns_of("systems"), &[0, 1]);
        assert_eq!(structure.unique_column("dci"), Some(2));
        assert_eq!(structure.columns_of("interactions"), &[3]);
        assert!(structure.columns_of("classes").is_empty());
    }
}
