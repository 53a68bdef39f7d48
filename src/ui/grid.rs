//! Delegated result renderer: maps result columns to the known catalog
//! fields and hands the mapped columns and rows to the comfy-table grid.

use crate::data::result_set::ResultSet;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

/// A mapped grid column: display title plus a stable field key
#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn {
    pub title: String,
    pub key: String,
}

/// Name-based lookup for the semantic catalog fields
const KNOWN_FIELDS: &[(&str, &str, &str)] = &[
    ("File Name", "File Name", "filename"),
    ("File Size", "Size", "size"),
    ("Extension", "Type", "type"),
    ("Relative Path", "Relative Path", "relpath"),
    ("Unique Id", "Unique Id", "filekey"),
];

/// Map result columns to grid column definitions. Unrecognized columns fall
/// back to a generic definition: title is the raw name, key is the name with
/// internal whitespace stripped.
pub fn map_columns(columns: &[String]) -> Vec<GridColumn> {
    columns
        .iter()
        .map(|name| {
            if let Some((_, title, key)) = KNOWN_FIELDS.iter().find(|(n, _, _)| n == name) {
                GridColumn {
                    title: title.to_string(),
                    key: key.to_string(),
                }
            } else {
                GridColumn {
                    title: name.clone(),
                    key: name.split_whitespace().collect(),
                }
            }
        })
        .collect()
}

/// Build the grid widget for a result set
pub fn build_grid(result: &ResultSet) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = map_columns(&result.columns)
        .into_iter()
        .map(|col| Cell::new(col.title).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(headers);

    for row in result.to_text_rows() {
        table.add_row(row);
    }

    table
}

/// Print a result via the grid, for the one-shot command line target
pub fn print_result(result: &ResultSet) {
    println!("{}", build_grid(result));
    println!("{} rows returned", result.row_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::result_set::CellValue;

    #[test]
    fn known_columns_map_to_semantic_fields() {
        let mapped = map_columns(&[
            "File Name".to_string(),
            "File Size".to_string(),
            "Extension".to_string(),
        ]);
        assert_eq!(mapped[0].key, "filename");
        assert_eq!(mapped[1].title, "Size");
        assert_eq!(mapped[2].key, "type");
    }

    #[test]
    fn unrecognized_columns_fall_back_to_generic_definition() {
        let mapped = map_columns(&["Readable  Size".to_string()]);
        assert_eq!(mapped[0].title, "Readable  Size");
        assert_eq!(mapped[0].key, "ReadableSize");
    }

    #[test]
    fn grid_carries_all_rows() {
        let rs = ResultSet::new(
            vec!["File Name".to_string()],
            vec![
                vec![CellValue::Text("a.pdf".to_string())],
                vec![CellValue::Text("b.doc".to_string())],
            ],
        );
        let grid = build_grid(&rs);
        let rendered = grid.to_string();
        assert!(rendered.contains("a.pdf"));
        assert!(rendered.contains("b.doc"));
    }
}
