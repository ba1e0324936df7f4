//! Untyped CSV table: header names and string cells, nothing coerced yet.

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parses comma-separated text with a header row.
    ///
    /// Short rows are padded with empty cells so every row has one cell per
    /// header; empty cells are treated as missing by the normalizer.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().take(width).map(|s| s.to_string()).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replaces all header names by position. No-op unless the widths match.
    pub fn rename_positional(&mut self, names: &[&str]) -> bool {
        if names.len() != self.headers.len() {
            return false;
        }
        self.headers = names.iter().map(|s| s.to_string()).collect();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_and_rows() {
        let t = RawTable::from_csv_str("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(t.headers, ["a", "b"]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows[1], ["3", "4"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let t = RawTable::from_csv_str("a,b,c\n1\n").unwrap();
        assert_eq!(t.rows[0], ["1", "", ""]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let t = RawTable::from_csv_str("a,b\n").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.column_count(), 2);
    }

    #[test]
    fn test_rename_positional_requires_matching_width() {
        let mut t = RawTable::from_csv_str("x,y\n1,2\n").unwrap();
        assert!(!t.rename_positional(&["a"]));
        assert!(t.rename_positional(&["a", "b"]));
        assert_eq!(t.headers, ["a", "b"]);
    }
}
