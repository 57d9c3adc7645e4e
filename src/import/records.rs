//! Record assembler.
//!
//! Resolves every cleaned data row into one [`Molecule`]: unique values
//! verbatim, multi-valued cells through the property lookups, hierarchical
//! cells to the deepest resolvable classification node.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::models::{Classification, Molecule, Property};
use crate::reader::Cell;
use crate::schema::{ColumnDescriptor, FileStructure};

/// Assemble one molecule per row, ids 1..N in row order.
///
/// Rows are expected to be already cleaned (header removed, blank-key rows
/// dropped). References that do not resolve are silently omitted; header
/// validation already guaranteed column presence.
pub fn assemble_records(
    rows: &[Vec<Cell>],
    structure: &FileStructure,
    schema: &[ColumnDescriptor],
    classifications: &[Classification],
    properties: &[Property],
) -> Vec<Molecule> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            assemble_row(index as u32 + 1, row, structure, schema, classifications, properties)
        })
        .collect()
}

fn assemble_row(
    id: u32,
    row: &[Cell],
    structure: &FileStructure,
    schema: &[ColumnDescriptor],
    classifications: &[Classification],
    properties: &[Property],
) -> Molecule {
    let mut unique_fields = BTreeMap::new();
    let mut classification_refs = BTreeMap::new();
    let mut property_refs = BTreeMap::new();

    for descriptor in schema {
        if descriptor.unique {
            let value = structure
                .unique_column(descriptor.property)
                .and_then(|column| row.get(column))
                .map(Cell::to_json)
                .unwrap_or(Value::Null);
            unique_fields.insert(descriptor.property.to_string(), value);
        } else if descriptor.hierarchical {
            let classification = classifications
                .iter()
                .find(|c| c.name == descriptor.property);
            let node_id = classification.and_then(|classification| {
                resolve_deepest(row, structure.columns_of(descriptor.property), classification)
            });
            classification_refs.insert(descriptor.property.to_string(), node_id);
        } else if descriptor.multi_valued {
            let property = properties.iter().find(|p| p.name == descriptor.property);
            let mut ids = BTreeSet::new();
            if let Some(property) = property {
                for &column in structure.columns_of(descriptor.property) {
                    if let Some(text) = row.get(column).and_then(Cell::as_text) {
                        if let Some(value_id) = property.find_id(&text) {
                            ids.insert(value_id);
                        }
                    }
                }
            }
            property_refs.insert(descriptor.property.to_string(), ids);
        }
    }

    Molecule {
        id,
        unique_fields,
        classification_refs,
        property_refs,
    }
}

/// Scan the hierarchical columns from finest back toward coarsest and
/// return the first non-blank cell that resolves to a known node: the
/// deepest specified classification wins.
fn resolve_deepest(
    row: &[Cell],
    columns: &[usize],
    classification: &Classification,
) -> Option<u32> {
    for &column in columns.iter().rev() {
        if let Some(text) = row.get(column).and_then(Cell::as_text) {
            if let Some(id) = classification.find_id(&text) {
                return Some(id);
            }
        }
    }
    None
}
