//! Dataset emitters: normalized JSON document or SQL insert script.

pub mod sql;

pub use sql::dataset_to_sql;

use serde_json::Value;

use crate::models::Dataset;

/// Emit the dataset as a single JSON document.
pub fn dataset_to_json(dataset: &Dataset) -> Value {
    dataset.to_json()
}

/// Pretty-printed JSON document.
pub fn dataset_to_json_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    dataset.to_json_string()
}
