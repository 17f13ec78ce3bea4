//! Tab-delimited result-table parsing.
//!
//! The analysis service exports tables with a header row, one row per
//! sequence, and a trailing tab that yields placeholder "Unnamed" columns.
//! Those columns are dropped, empty cells become explicit `None`, and rows
//! are grouped by a shared identifier column.

use std::io::BufRead;

use indexmap::IndexMap;

use crate::error::{CllError, CllResult};

/// A row keyed by column header; empty cells are None.
pub type TableRow = IndexMap<String, Option<String>>;

/// A parsed tab-delimited table.
#[derive(Debug, Clone)]
pub struct TabTable {
    /// Column headers, placeholder columns removed, in file order.
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

fn is_placeholder(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed")
}

/// Parse a tab-delimited table with a header row.
///
/// Rows shorter than the header are padded with null cells; rows wider than
/// the header are malformed content and fail hard. `file_label` names the
/// source in errors.
pub fn read_table<R: BufRead>(reader: R, file_label: &str) -> CllResult<TabTable> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => {
                return Err(CllError::parse(file_label, 1, "missing header row"));
            }
        }
    };

    // Physical index -> kept header name
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (idx, name) in header.split('\t').enumerate() {
        let name = name.trim();
        if !is_placeholder(name) {
            kept.push((idx, name.to_string()));
        }
    }
    let width = header.split('\t').count();
    let columns: Vec<String> = kept.iter().map(|(_, name)| name.clone()).collect();

    let mut rows = Vec::new();
    for (lineno, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() > width {
            return Err(CllError::parse(
                file_label,
                lineno + 1,
                format!("row has {} cells, header has {}", cells.len(), width),
            ));
        }

        let mut row: TableRow = IndexMap::with_capacity(kept.len());
        for (idx, name) in &kept {
            let value = cells.get(*idx).map(|c| c.trim()).unwrap_or("");
            row.insert(
                name.clone(),
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                },
            );
        }
        rows.push(row);
    }

    Ok(TabTable { columns, rows })
}

/// Group rows by an identifier column, first row per identifier winning.
///
/// The identifier column itself is removed from the grouped rows. A row with
/// an empty identifier cell is malformed.
pub fn group_by_id(
    table: &TabTable,
    id_column: &str,
    file_label: &str,
) -> CllResult<IndexMap<String, TableRow>> {
    if !table.columns.iter().any(|c| c == id_column) {
        return Err(CllError::parse(
            file_label,
            1,
            format!("missing required column '{}'", id_column),
        ));
    }

    let mut grouped: IndexMap<String, TableRow> = IndexMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        let id = match row.get(id_column) {
            Some(Some(id)) => id.clone(),
            _ => {
                return Err(CllError::parse(
                    file_label,
                    i + 2,
                    format!("row has no '{}' value", id_column),
                ));
            }
        };
        if grouped.contains_key(&id) {
            continue;
        }
        let mut record = row.clone();
        record.shift_remove(id_column);
        grouped.insert(id, record);
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_drops_placeholder_columns_and_nulls_empty_cells() {
        let data = "Sequence ID\tV-GENE and allele\tUnnamed: 2\nSeq1\tIGHV1-2*02\t\nSeq2\t\t\n";
        let table = read_table(Cursor::new(data), "1_Summary.txt").unwrap();

        assert_eq!(table.columns, vec!["Sequence ID", "V-GENE and allele"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0]["V-GENE and allele"].as_deref(),
            Some("IGHV1-2*02")
        );
        assert!(table.rows[1]["V-GENE and allele"].is_none());
    }

    #[test]
    fn test_short_rows_padded_long_rows_rejected() {
        let data = "Sequence ID\tA\tB\nSeq1\tx\n";
        let table = read_table(Cursor::new(data), "t").unwrap();
        assert!(table.rows[0]["B"].is_none());

        let data = "Sequence ID\tA\nSeq1\tx\ty\tz\n";
        let err = read_table(Cursor::new(data), "t").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_missing_header() {
        let err = read_table(Cursor::new("\n\n"), "t").unwrap_err();
        assert!(err.to_string().contains("missing header row"));
    }

    #[test]
    fn test_group_by_id_first_row_wins() {
        let data = "Sequence ID\tScore\nSeq1\t10\nSeq2\t20\nSeq1\t99\n";
        let table = read_table(Cursor::new(data), "t").unwrap();
        let grouped = group_by_id(&table, "Sequence ID", "t").unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Seq1"]["Score"].as_deref(), Some("10"));
        assert_eq!(grouped["Seq2"]["Score"].as_deref(), Some("20"));
        // The identifier column is not repeated inside the record
        assert!(!grouped["Seq1"].contains_key("Sequence ID"));
    }

    #[test]
    fn test_group_by_id_requires_identifier() {
        let data = "Other\tScore\nx\t10\n";
        let table = read_table(Cursor::new(data), "t").unwrap();
        assert!(group_by_id(&table, "Sequence ID", "t").is_err());

        let data = "Sequence ID\tScore\n\t10\n";
        let table = read_table(Cursor::new(data), "t").unwrap();
        assert!(group_by_id(&table, "Sequence ID", "t").is_err());
    }
}
