//! Property builder.
//!
//! Folds the non-hierarchical, non-unique columns of the matrix into a flat
//! deduplicated value list with first-appearance ids.

use crate::models::{Property, PropertyValue};
use crate::reader::Cell;

/// Build one property from the matrix columns that carry it.
///
/// Ids are assigned 1, 2, 3... scanning rows in order and, within a row,
/// columns left to right. Blank cells are skipped; repeated names reuse
/// their first id.
pub fn build_property(
    id: u32,
    name: &str,
    table: &str,
    rows: &[Vec<Cell>],
    columns: &[usize],
) -> Property {
    let mut values: Vec<PropertyValue> = Vec::new();

    for row in rows {
        for &column in columns {
            let Some(text) = row.get(column).and_then(Cell::as_text) else {
                continue;
            };
            let text = text.trim().to_string();
            if text.is_empty() {
                continue;
            }
            if values.iter().any(|v| v.name == text) {
                continue;
            }
            values.push(PropertyValue {
                id: values.len() as u32 + 1,
                name: text,
            });
        }
    }

    Property {
        id,
        name: name.to_string(),
        table: table.to_string(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::parse(c)).collect()
    }

    #[test]
    fn test_first_appearance_ids() {
        let rows = vec![
            text_row(&["NAUSEE", "VERTIGE"]),
            text_row(&["CEPHALEE", "NAUSEE"]),
        ];
        let property = build_property(1, "side_effects", "side_effect", &rows, &[0, 1]);

        assert_eq!(property.values.len(), 3);
        assert_eq!(property.find_id("NAUSEE"), Some(1));
        assert_eq!(property.find_id("VERTIGE"), Some(2));
        assert_eq!(property.find_id("CEPHALEE"), Some(3));
    }

    #[test]
    fn test_blank_cells_skipped() {
        let rows = vec![text_row(&["", "NAUSEE", ""])];
        let property = build_property(1, "side_effects", "side_effect", &rows, &[0, 1, 2]);
        assert_eq!(property.values.len(), 1);
    }

    #[test]
    fn test_no_two_names_share_an_id() {
        let rows = vec![
            text_row(&["A"]),
            text_row(&["B"]),
            text_row(&["A"]),
        ];
        let property = build_property(1, "indications", "indication", &rows, &[0]);

        let mut ids: Vec<u32> = property.values.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), property.values.len());
    }

    #[test]
    fn test_absent_name_resolves_to_none() {
        let property = build_property(1, "indications", "indication", &[], &[]);
        assert_eq!(property.find_id("ABSENT"), None);
    }
}
