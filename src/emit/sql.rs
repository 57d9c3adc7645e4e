//! SQL emitter.
//!
//! Serializes a dataset as a script of semicolon-terminated INSERT
//! statements in foreign-key order: classification nodes (parents before
//! children), properties and their values, then molecules each followed by
//! their property-junction rows.
//!
//! Statements are built by a plain `(table, columns, values)` function and
//! every string value goes through [`SqlLiteral`] escaping; untrusted text
//! is never concatenated raw.

use std::fmt;

use crate::models::{junction_value_id, Classification, ClassificationNode, Dataset, Molecule};

/// One escaped SQL literal.
#[derive(Debug, Clone)]
pub enum SqlLiteral {
    Int(i64),
    BigInt(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlLiteral::Int(n) => write!(f, "{}", n),
            SqlLiteral::BigInt(n) => write!(f, "{}", n),
            SqlLiteral::Float(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            SqlLiteral::Float(n) => write!(f, "{}", n),
            SqlLiteral::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlLiteral::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            SqlLiteral::Null => write!(f, "NULL"),
        }
    }
}

impl From<&serde_json::Value> for SqlLiteral {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => SqlLiteral::Text(s.clone()),
            serde_json::Value::Number(n) => {
                SqlLiteral::Float(n.as_f64().unwrap_or_default())
            }
            serde_json::Value::Bool(b) => SqlLiteral::Bool(*b),
            _ => SqlLiteral::Null,
        }
    }
}

/// Build one INSERT statement.
pub fn insert_statement(table: &str, columns: &[&str], values: &[SqlLiteral]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table,
        columns.join(", "),
        rendered.join(", ")
    )
}

/// Emit the whole dataset as an SQL script.
pub fn dataset_to_sql(dataset: &Dataset) -> String {
    let mut script = String::new();
    script.push_str("-- pharmload SQL export\n");
    script.push_str(&format!("-- generated: {}\n\n", chrono::Utc::now().to_rfc3339()));

    for classification in &dataset.classifications {
        emit_classification(&mut script, classification);
        script.push('\n');
    }

    emit_properties(&mut script, dataset);
    script.push('\n');

    for molecule in &dataset.molecules {
        emit_molecule(&mut script, dataset, molecule);
    }

    script
}

/// Pre-order walk; ids were assigned in construction order so a parent is
/// always inserted before its children.
fn emit_classification(script: &mut String, classification: &Classification) {
    fn walk(
        script: &mut String,
        table: &str,
        nodes: &[ClassificationNode],
        parent: Option<u32>,
        level: u32,
    ) {
        for node in nodes {
            let parent_literal = match parent {
                Some(id) => SqlLiteral::Int(id as i64),
                None => SqlLiteral::Null,
            };
            script.push_str(&insert_statement(
                table,
                &["id", "name", "parent", "level"],
                &[
                    SqlLiteral::Int(node.id as i64),
                    SqlLiteral::Text(node.name.clone()),
                    parent_literal,
                    SqlLiteral::Int(level as i64),
                ],
            ));
            script.push('\n');
            walk(script, table, &node.children, Some(node.id), level + 1);
        }
    }

    walk(script, &classification.table, &classification.forest, None, 1);
}

fn emit_properties(script: &mut String, dataset: &Dataset) {
    for property in &dataset.properties {
        script.push_str(&insert_statement(
            "property",
            &["id", "name"],
            &[
                SqlLiteral::Int(property.id as i64),
                SqlLiteral::Text(property.name.clone()),
            ],
        ));
        script.push('\n');
    }
    for property in &dataset.properties {
        for value in &property.values {
            script.push_str(&insert_statement(
                "property_value",
                &["id", "property", "name"],
                &[
                    SqlLiteral::BigInt(junction_value_id(property.id, value.id)),
                    SqlLiteral::Int(property.id as i64),
                    SqlLiteral::Text(value.name.clone()),
                ],
            ));
            script.push('\n');
        }
    }
}

/// One molecule row, immediately followed by its junction rows.
fn emit_molecule(script: &mut String, dataset: &Dataset, molecule: &Molecule) {
    let mut columns: Vec<&str> = vec!["id"];
    let mut values: Vec<SqlLiteral> = vec![SqlLiteral::Int(molecule.id as i64)];

    for (name, value) in &molecule.unique_fields {
        columns.push(name);
        values.push(SqlLiteral::from(value));
    }
    for (name, node_id) in &molecule.classification_refs {
        // Classification reference columns carry the table name.
        if let Some(classification) = dataset.classification(name) {
            columns.push(&classification.table);
            values.push(match node_id {
                Some(id) => SqlLiteral::Int(*id as i64),
                None => SqlLiteral::Null,
            });
        }
    }

    script.push_str(&insert_statement("molecule", &columns, &values));
    script.push('\n');

    for (name, ids) in &molecule.property_refs {
        let Some(property) = dataset.property(name) else {
            continue;
        };
        for value_id in ids {
            script.push_str(&insert_statement(
                "molecule_property",
                &["molecule", "property_value"],
                &[
                    SqlLiteral::Int(molecule.id as i64),
                    SqlLiteral::BigInt(junction_value_id(property.id, *value_id)),
                ],
            ));
            script.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_bytes;

    #[test]
    fn test_text_escaping() {
        let statement = insert_statement(
            "property_value",
            &["id", "name"],
            &[SqlLiteral::Int(1), SqlLiteral::Text("L'ANGINE".into())],
        );
        assert_eq!(
            statement,
            "INSERT INTO property_value (id, name) VALUES (1, 'L''ANGINE');"
        );
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(SqlLiteral::Null.to_string(), "NULL");
        assert_eq!(SqlLiteral::Bool(true).to_string(), "TRUE");
        assert_eq!(SqlLiteral::Float(2.0).to_string(), "2");
        assert_eq!(SqlLiteral::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_foreign_key_order() {
        let csv = "DCI;MTE;FORMULE_CHIMIQUE;NIVEAU_DEBUTANT;NIVEAU_EXPERT;\
                   CLASSE_1;SYSTEME_1;SYSTEME_2;INDICATION;INTERACTION;EFFET_INDESIRABLE\n\
                   ZANAMIVIR;true;C12;1;2;ANTIVIRAL;ANTIINFECTIEUX;ANTIVIRAUX;GRIPPE;NAUSEE;VERTIGE";
        let dataset = import_bytes(csv.as_bytes()).unwrap().dataset;
        let script = dataset_to_sql(&dataset);

        // Parent system row precedes its child.
        let parent = script.find("'ANTIINFECTIEUX'").unwrap();
        let child = script.find("'ANTIVIRAUX'").unwrap();
        assert!(parent < child);

        // Property rows precede their values, molecules precede junctions.
        let property = script.find("INSERT INTO property ").unwrap();
        let value = script.find("INSERT INTO property_value ").unwrap();
        let molecule = script.find("INSERT INTO molecule ").unwrap();
        let junction = script.find("INSERT INTO molecule_property ").unwrap();
        assert!(property < value);
        assert!(value < molecule);
        assert!(molecule < junction);
    }

    #[test]
    fn test_classification_levels_and_parents() {
        let csv = "DCI;MTE;FORMULE_CHIMIQUE;NIVEAU_DEBUTANT;NIVEAU_EXPERT;\
                   CLASSE_1;SYSTEME_1;SYSTEME_2;INDICATION;INTERACTION;EFFET_INDESIRABLE\n\
                   ZANAMIVIR;true;C12;1;2;A;S1;S2;I;INT;E";
        let dataset = import_bytes(csv.as_bytes()).unwrap().dataset;
        let script = dataset_to_sql(&dataset);

        assert!(script.contains(
            "INSERT INTO system (id, name, parent, level) VALUES (1, 'S1', NULL, 1);"
        ));
        assert!(script.contains(
            "INSERT INTO system (id, name, parent, level) VALUES (2, 'S2', 1, 2);"
        ));
    }

    #[test]
    fn test_junction_uses_packed_value_id() {
        let csv = "DCI;MTE;FORMULE_CHIMIQUE;NIVEAU_DEBUTANT;NIVEAU_EXPERT;\
                   CLASSE_1;SYSTEME_1;INDICATION;INTERACTION;EFFET_INDESIRABLE\n\
                   ZANAMIVIR;true;C12;1;2;A;S;I;NAUSEE;E";
        let dataset = import_bytes(csv.as_bytes()).unwrap().dataset;
        let interactions = dataset.property("interactions").unwrap();
        let packed = junction_value_id(interactions.id, 1);

        let script = dataset_to_sql(&dataset);
        assert!(script.contains(&format!(
            "INSERT INTO molecule_property (molecule, property_value) VALUES (1, {});",
            packed
        )));
    }
}
