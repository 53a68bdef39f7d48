//! Builds the SQL condition fragment for the basic search form.
//!
//! The output is a pure function of the captured form state: a `WHERE` clause
//! on the selected column, an optional extension filter, an optional
//! `GROUP BY` for duplicate suppression and an `ORDER BY` on the sort column.
//! Search text is interpolated directly into the fragment; this tool queries
//! trusted local catalog databases and does not harden against injection.

use thiserror::Error;

/// Column used to fold duplicate files into one row
pub const DEDUP_KEY: &str = "\"Checksum\"";

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("undefined search field: {0}")]
    UndefinedSearchField(String),
}

/// File-type filter checkboxes offered by the basic search form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Pdf,
    Word,
    Excel,
    Powerpoint,
    Email,
    Image,
    Text,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 7] = [
        TypeFilter::Pdf,
        TypeFilter::Word,
        TypeFilter::Excel,
        TypeFilter::Powerpoint,
        TypeFilter::Email,
        TypeFilter::Image,
        TypeFilter::Text,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::Pdf => "PDF",
            TypeFilter::Word => "Word",
            TypeFilter::Excel => "Excel",
            TypeFilter::Powerpoint => "PowerPoint",
            TypeFilter::Email => "Email",
            TypeFilter::Image => "Image",
            TypeFilter::Text => "Text",
        }
    }

    /// Condition matching the extensions the upstream cataloger records
    pub fn clause(&self) -> &'static str {
        match self {
            TypeFilter::Pdf => "\"Extension\" IN ('.pdf')",
            TypeFilter::Word => "\"Extension\" IN ('.doc', '.docx')",
            TypeFilter::Excel => "\"Extension\" IN ('.xls', '.xlsx', '.xlsm')",
            TypeFilter::Powerpoint => "\"Extension\" IN ('.ppt', '.pptx')",
            TypeFilter::Email => "\"Extension\" IN ('.msg', '.eml')",
            TypeFilter::Image => "\"Extension\" IN ('.jpg', '.jpeg', '.png', '.tif', '.tiff')",
            TypeFilter::Text => "\"Extension\" IN ('.txt', '.csv')",
        }
    }
}

/// Snapshot of the basic search form, captured at execute time
#[derive(Debug, Clone)]
pub struct SearchForm {
    /// Raw search text
    pub text: String,
    /// Field selector value: "filename", "relpath" or "filekey"
    pub field: String,
    /// Checked file-type boxes, in display order
    pub types: Vec<TypeFilter>,
    /// The "all types" override; when set, individual boxes are ignored
    pub all_types: bool,
    /// Whether duplicate files (same checksum) are kept as separate rows
    pub include_duplicates: bool,
}

impl SearchForm {
    pub fn new(text: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            field: field.into(),
            types: Vec::new(),
            all_types: true,
            include_duplicates: true,
        }
    }
}

/// Map a field selector value to its search column and sort column.
///
/// The sort column for "filekey" is "File Name", not "Unique Id": id searches
/// order their hits by name.
fn map_field(field: &str) -> Result<(&'static str, &'static str), BuildError> {
    match field {
        "filename" => Ok(("\"File Name\"", "\"File Name\"")),
        "relpath" => Ok(("\"Relative Path\"", "\"Relative Path\"")),
        "filekey" => Ok(("\"Unique Id\"", "\"File Name\"")),
        other => Err(BuildError::UndefinedSearchField(other.to_string())),
    }
}

/// Normalize search text into a LIKE pattern: wrap in `%...%`, then treat
/// every `*` and every whitespace character as a wildcard.
fn like_pattern(text: &str) -> String {
    let normalized: String = text
        .chars()
        .map(|c| if c == '*' || c.is_whitespace() { '%' } else { c })
        .collect();
    format!("%{}%", normalized)
}

/// Build the SQL condition fragment for a form snapshot.
///
/// Shape: `WHERE <field> LIKE "%<pattern>%" [AND (<type> [OR <type> ...])]
/// [GROUP BY <dedup-key>] ORDER BY <sort-field>`.
pub fn build_condition(form: &SearchForm) -> Result<String, BuildError> {
    let (search_col, sort_col) = map_field(&form.field)?;

    let mut fragment = format!(
        "WHERE {} LIKE \"{}\"",
        search_col,
        like_pattern(&form.text)
    );

    if !form.all_types && !form.types.is_empty() {
        let clauses: Vec<&str> = form.types.iter().map(|t| t.clause()).collect();
        if clauses.len() == 1 {
            fragment.push_str(&format!(" AND {}", clauses[0]));
        } else {
            fragment.push_str(&format!(" AND ( {} )", clauses.join(" OR ")));
        }
    }

    if !form.include_duplicates {
        fragment.push_str(&format!(" GROUP BY {}", DEDUP_KEY));
    }

    fragment.push_str(&format!(" ORDER BY {}", sort_col));

    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str, field: &str) -> SearchForm {
        SearchForm::new(text, field)
    }

    #[test]
    fn maps_each_field_to_its_column() {
        let cases = [
            ("filename", "\"File Name\""),
            ("relpath", "\"Relative Path\""),
            ("filekey", "\"Unique Id\""),
        ];
        for (field, column) in cases {
            let fragment = build_condition(&form("report", field)).unwrap();
            assert!(
                fragment.starts_with(&format!("WHERE {} LIKE", column)),
                "field {} produced {}",
                field,
                fragment
            );
        }
    }

    #[test]
    fn unknown_field_is_an_error_not_a_partial_clause() {
        let err = build_condition(&form("report", "mystery")).unwrap_err();
        assert_eq!(err, BuildError::UndefinedSearchField("mystery".to_string()));
    }

    #[test]
    fn wildcards_and_whitespace_become_percent() {
        let fragment = build_condition(&form("foo bar", "filename")).unwrap();
        assert!(fragment.contains("LIKE \"%foo%bar%\""), "{}", fragment);

        let fragment = build_condition(&form("a*b\tc", "filename")).unwrap();
        assert!(fragment.contains("LIKE \"%a%b%c%\""), "{}", fragment);
    }

    #[test]
    fn empty_text_matches_everything() {
        let fragment = build_condition(&form("", "filename")).unwrap();
        assert!(fragment.contains("LIKE \"%%\""), "{}", fragment);
    }

    #[test]
    fn zero_type_boxes_emit_no_and_clause() {
        let mut f = form("x", "filename");
        f.all_types = false;
        f.types = vec![];
        let fragment = build_condition(&f).unwrap();
        assert!(!fragment.contains(" AND "), "{}", fragment);
    }

    #[test]
    fn one_type_box_is_a_bare_and_clause() {
        let mut f = form("x", "filename");
        f.all_types = false;
        f.types = vec![TypeFilter::Pdf];
        let fragment = build_condition(&f).unwrap();
        assert!(
            fragment.contains("AND \"Extension\" IN ('.pdf')"),
            "{}",
            fragment
        );
        assert!(!fragment.contains("AND ("), "{}", fragment);
    }

    #[test]
    fn two_type_boxes_are_parenthesized() {
        // Exact boundary at the 1 -> 2 transition
        let mut f = form("x", "filename");
        f.all_types = false;
        f.types = vec![TypeFilter::Pdf, TypeFilter::Word];
        let fragment = build_condition(&f).unwrap();
        assert!(
            fragment.contains(
                "AND ( \"Extension\" IN ('.pdf') OR \"Extension\" IN ('.doc', '.docx') )"
            ),
            "{}",
            fragment
        );
    }

    #[test]
    fn all_box_suppresses_individual_boxes() {
        let mut f = form("x", "filename");
        f.all_types = true;
        f.types = vec![TypeFilter::Pdf, TypeFilter::Excel, TypeFilter::Image];
        let fragment = build_condition(&f).unwrap();
        assert!(!fragment.contains("Extension"), "{}", fragment);
    }

    #[test]
    fn omitting_duplicates_groups_on_checksum() {
        let mut f = form("x", "filename");
        f.include_duplicates = false;
        let fragment = build_condition(&f).unwrap();
        assert!(fragment.contains("GROUP BY \"Checksum\""), "{}", fragment);

        f.include_duplicates = true;
        let fragment = build_condition(&f).unwrap();
        assert!(!fragment.contains("GROUP BY"), "{}", fragment);
    }

    #[test]
    fn group_by_precedes_order_by() {
        let mut f = form("x", "filename");
        f.include_duplicates = false;
        let fragment = build_condition(&f).unwrap();
        let group = fragment.find("GROUP BY").unwrap();
        let order = fragment.find("ORDER BY").unwrap();
        assert!(group < order, "{}", fragment);
    }

    #[test]
    fn filekey_sorts_by_file_name() {
        // Id searches order by name, not by the id itself
        let fragment = build_condition(&form("x", "filekey")).unwrap();
        assert!(
            fragment.ends_with("ORDER BY \"File Name\""),
            "{}",
            fragment
        );
        assert!(fragment.contains("WHERE \"Unique Id\" LIKE"), "{}", fragment);
    }

    #[test]
    fn full_fragment_shape() {
        let mut f = form("q4 report", "relpath");
        f.all_types = false;
        f.types = vec![TypeFilter::Excel];
        f.include_duplicates = false;
        let fragment = build_condition(&f).unwrap();
        assert_eq!(
            fragment,
            "WHERE \"Relative Path\" LIKE \"%q4%report%\" \
             AND \"Extension\" IN ('.xls', '.xlsx', '.xlsm') \
             GROUP BY \"Checksum\" ORDER BY \"Relative Path\""
        );
    }
}
