//! Classification builder.
//!
//! Folds the hierarchical columns of the matrix into a forest of named
//! nodes. Each row's cells encode a path from coarsest to finest level;
//! repeated segments at the same tree position are deduplicated and every
//! newly-seen segment gets the next surrogate id.

use crate::models::{Classification, ClassificationNode, ROOT_ID};
use crate::reader::Cell;

/// Build one classification from the matrix columns that carry it.
///
/// Ids are assigned in order of first appearance, starting right after the
/// synthetic root (id 0, never emitted). A blank cell ends the row's path;
/// deeper cells of that row are ignored. Rows must be processed in original
/// order so ids stay stable across runs.
pub fn build_classification(
    name: &str,
    table: &str,
    rows: &[Vec<Cell>],
    columns: &[usize],
) -> Classification {
    let mut forest: Vec<ClassificationNode> = Vec::new();
    let mut next_id = ROOT_ID + 1;

    for row in rows {
        let mut children = &mut forest;

        for &column in columns {
            let Some(segment) = row.get(column).and_then(Cell::as_text) else {
                break;
            };
            let segment = segment.trim().to_string();
            if segment.is_empty() {
                break;
            }

            let position = match children.iter().position(|c| c.name == segment) {
                Some(position) => position,
                None => {
                    children.push(ClassificationNode::new(next_id, segment));
                    next_id += 1;
                    children.len() - 1
                }
            };
            children = &mut children[position].children;
        }
    }

    Classification {
        name: name.to_string(),
        table: table.to_string(),
        forest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::parse(c)).collect()
    }

    #[test]
    fn test_shared_prefix_deduplicated() {
        let rows = vec![
            text_row(&["ANTIINFECTIEUX", "ANTIVIRAUX"]),
            text_row(&["ANTIINFECTIEUX", "ANTIBIOTIQUES"]),
        ];
        let classification = build_classification("systems", "system", &rows, &[0, 1]);

        assert_eq!(classification.forest.len(), 1);
        let top = &classification.forest[0];
        assert_eq!(top.id, 1);
        assert_eq!(top.name, "ANTIINFECTIEUX");
        assert_eq!(top.children.len(), 2);
        assert_eq!(top.children[0].id, 2);
        assert_eq!(top.children[0].name, "ANTIVIRAUX");
        assert_eq!(top.children[1].id, 3);
        assert_eq!(top.children[1].name, "ANTIBIOTIQUES");
    }

    #[test]
    fn test_blank_cell_ends_path() {
        let rows = vec![
            text_row(&["CARDIOLOGIE", "", "IGNORE_ME"]),
            text_row(&["CARDIOLOGIE", "HYPERTENSION", "DIURETIQUES"]),
        ];
        let classification = build_classification("classes", "class", &rows, &[0, 1, 2]);

        let top = &classification.forest[0];
        assert_eq!(top.children.len(), 1);
        assert_eq!(top.children[0].name, "HYPERTENSION");
        assert_eq!(top.children[0].children[0].name, "DIURETIQUES");
        // The cell after the blank never became a node.
        assert!(classification.find_id("IGNORE_ME").is_none());
    }

    #[test]
    fn test_ids_are_preorder_of_first_appearance() {
        let rows = vec![
            text_row(&["A", "B"]),
            text_row(&["C", "D"]),
            text_row(&["A", "E"]),
        ];
        let classification = build_classification("systems", "system", &rows, &[0, 1]);

        assert_eq!(classification.find_id("A"), Some(1));
        assert_eq!(classification.find_id("B"), Some(2));
        assert_eq!(classification.find_id("C"), Some(3));
        assert_eq!(classification.find_id("D"), Some(4));
        assert_eq!(classification.find_id("E"), Some(5));
    }

    #[test]
    fn test_every_node_reachable_through_find_id() {
        let rows = vec![
            text_row(&["A", "B", "C"]),
            text_row(&["A", "D"]),
            text_row(&["E"]),
        ];
        let classification = build_classification("systems", "system", &rows, &[0, 1, 2]);

        let mut ids = Vec::new();
        let mut stack: Vec<&crate::models::ClassificationNode> =
            classification.forest.iter().collect();
        while let Some(node) = stack.pop() {
            assert_eq!(classification.find_id(&node.name), Some(node.id));
            ids.push(node.id);
            stack.extend(node.children.iter());
        }

        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5, "ids must be unique within the classification");
    }

    #[test]
    fn test_id_spaces_reset_per_classification() {
        let rows = vec![text_row(&["X"])];
        let a = build_classification("systems", "system", &rows, &[0]);
        let b = build_classification("classes", "class", &rows, &[0]);
        assert_eq!(a.find_id("X"), Some(1));
        assert_eq!(b.find_id("X"), Some(1));
    }

    #[test]
    fn test_empty_columns_yield_empty_forest() {
        let rows = vec![text_row(&["A"])];
        let classification = build_classification("systems", "system", &rows, &[]);
        assert!(classification.forest.is_empty());
    }
}
