//! Domain models for the import pipeline.
//!
//! - [`Classification`] - a named forest of classification nodes
//! - [`ClassificationNode`] - one category with its children
//! - [`Property`] - a flat multi-valued attribute with its value list
//! - [`Molecule`] - one normalized record with fixed reference maps
//! - [`Dataset`] - the complete import result
//!
//! All structures are rebuilt from scratch on every import run; ordering is
//! deterministic so re-running on the same file yields byte-identical JSON.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{json, Map, Value};

// =============================================================================
// Classifications
// =============================================================================

/// Synthetic root id; the root itself is never emitted.
pub const ROOT_ID: u32 = 0;

/// One node of a classification forest.
///
/// Sibling names are unique; ids are assigned in pre-order of first
/// appearance and never reused.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationNode {
    pub id: u32,
    pub name: String,
    pub children: Vec<ClassificationNode>,
}

impl ClassificationNode {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// A named classification hierarchy (e.g. `systems`, `classes`).
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Property name, the key used in emitted documents.
    pub name: String,
    /// Relational table name for SQL emission.
    pub table: String,
    /// Top-level nodes (children of the unexported root).
    pub forest: Vec<ClassificationNode>,
}

impl Classification {
    /// Find a node id by exact name: direct children of each searched node
    /// first, then their descendants depth-first. Blank names never match.
    pub fn find_id(&self, name: &str) -> Option<u32> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        find_in_children(&self.forest, trimmed)
    }
}

fn find_in_children(children: &[ClassificationNode], name: &str) -> Option<u32> {
    for child in children {
        if child.name == name {
            return Some(child.id);
        }
    }
    for child in children {
        if let Some(id) = find_in_children(&child.children, name) {
            return Some(id);
        }
    }
    None
}

// =============================================================================
// Properties
// =============================================================================

/// One distinct value of a flat property.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyValue {
    /// Local id, assigned 1, 2, 3... in first-appearance order.
    pub id: u32,
    pub name: String,
}

/// A flat, non-hierarchical attribute (e.g. `indications`).
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    /// Property id, assigned from schema declaration order.
    pub id: u32,
    /// Property name, the key used in emitted documents.
    pub name: String,
    /// Relational table name recorded in the `property` table.
    pub table: String,
    /// Distinct values in first-appearance order.
    pub values: Vec<PropertyValue>,
}

impl Property {
    /// Id of a value by exact name, or `None` when absent.
    pub fn find_id(&self, name: &str) -> Option<u32> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.values.iter().find(|v| v.name == trimmed).map(|v| v.id)
    }
}

/// Global property-value id for junction storage.
///
/// Local value ids restart at 1 for every property, so the junction key
/// packs (property id, local id) into one collision-free integer.
pub fn junction_value_id(property_id: u32, value_id: u32) -> u64 {
    ((property_id as u64) << 32) | value_id as u64
}

// =============================================================================
// Molecules
// =============================================================================

/// One normalized molecule record.
///
/// Three fixed maps keyed by declared property names replace the dynamic
/// field bags of ad-hoc importers; keys are validated against the column
/// schema at construction.
#[derive(Debug, Clone, Serialize)]
pub struct Molecule {
    /// Sequential id, 1..N in row order.
    pub id: u32,
    /// Unique-column values, verbatim (`null` when absent).
    pub unique_fields: BTreeMap<String, Value>,
    /// Classification name to deepest resolved node id.
    pub classification_refs: BTreeMap<String, Option<u32>>,
    /// Property name to set of local value ids.
    pub property_refs: BTreeMap<String, BTreeSet<u32>>,
}

impl Molecule {
    /// Flattened JSON object: id, unique fields, then reference maps.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), json!(self.id));
        for (name, value) in &self.unique_fields {
            obj.insert(name.clone(), value.clone());
        }
        for (name, node_id) in &self.classification_refs {
            obj.insert(name.clone(), json!(node_id));
        }
        for (name, ids) in &self.property_refs {
            obj.insert(name.clone(), json!(ids));
        }
        Value::Object(obj)
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// The complete result of one import run.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Classifications in schema declaration order.
    pub classifications: Vec<Classification>,
    /// Properties in schema declaration order.
    pub properties: Vec<Property>,
    /// Molecules in row order.
    pub molecules: Vec<Molecule>,
}

impl Dataset {
    /// Classification by property name.
    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }

    /// Property by property name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Emit the dataset as one JSON document: a key per classification and
    /// property, plus `molecules`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for classification in &self.classifications {
            obj.insert(classification.name.clone(), json!(classification.forest));
        }
        for property in &self.properties {
            obj.insert(property.name.clone(), json!(property.values));
        }
        obj.insert(
            "molecules".into(),
            Value::Array(self.molecules.iter().map(Molecule::to_json).collect()),
        );
        Value::Object(obj)
    }

    /// Pretty-printed JSON document.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }
}
