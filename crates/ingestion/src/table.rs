//! Header-addressed CSV table reader.
//!
//! Both session tables are plain comma-separated files with a single header
//! row. Cells are trimmed; blank lines are skipped. Quoting is not supported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{IngestionError, Result};

/// One data row together with its 1-based line number in the source
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Parsed table
#[derive(Debug, Clone)]
pub struct CsvTable {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl CsvTable {
    /// Read a table from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestionError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
            .map_err(|e| match e {
                IngestionError::Io { source, .. } => IngestionError::io(path, source),
                other => other,
            })
    }

    /// Read a table from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, source_name: impl Into<String>) -> Result<Self> {
        let source_name = source_name.into();
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| IngestionError::io(&source_name, e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cells: Vec<String> = line.split(',').map(|c| c.trim().to_string()).collect();
            match &headers {
                None => headers = Some(cells),
                Some(header) => {
                    if cells.len() != header.len() {
                        return Err(IngestionError::RowWidth {
                            line: idx + 1,
                            expected: header.len(),
                            found: cells.len(),
                        });
                    }
                    rows.push(Row {
                        line: idx + 1,
                        cells,
                    });
                }
            }
        }

        let headers = headers.ok_or_else(|| IngestionError::Empty {
            source_name: source_name.clone(),
        })?;

        Ok(Self {
            source_name,
            headers,
            rows,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column
    pub fn column(&self, name: &str) -> Result<Column<'_>> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|index| Column {
                name: &self.headers[index],
                index,
            })
            .ok_or_else(|| IngestionError::MissingColumn {
                source_name: self.source_name.clone(),
                column: name.to_string(),
            })
    }
}

/// Resolved column handle
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    name: &'a str,
    index: usize,
}

impl Column<'_> {
    /// Raw cell text
    pub fn raw<'r>(&self, row: &'r Row) -> &'r str {
        &row.cells[self.index]
    }

    /// Parse a cell, reporting line and column on failure
    pub fn parse<T: FromStr>(&self, row: &Row) -> Result<T> {
        let raw = self.raw(row);
        raw.parse::<T>()
            .map_err(|_| IngestionError::parse(row.line, self.name, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_table_with_blank_lines() {
        let input = "A, B\n1,2\n\n3,4\n";
        let table = CsvTable::from_reader(Cursor::new(input), "mem").unwrap();
        assert_eq!(table.headers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].line, 4);

        let b = table.column("B").unwrap();
        let values: Vec<i64> = table
            .rows()
            .iter()
            .map(|row| b.parse(row).unwrap())
            .collect();
        assert_eq!(values, vec![2, 4]);
    }

    #[test]
    fn test_missing_column() {
        let table = CsvTable::from_reader(Cursor::new("A\n1\n"), "mem").unwrap();
        let err = table.column("B").unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumn { ref column, .. } if column == "B"));
    }

    #[test]
    fn test_parse_error_reports_line_and_column() {
        let table = CsvTable::from_reader(Cursor::new("A\n1\nx\n"), "mem").unwrap();
        let a = table.column("A").unwrap();
        let err = a.parse::<f64>(&table.rows()[1]).unwrap_err();
        match err {
            IngestionError::Parse {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "A");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        let err = CsvTable::from_reader(Cursor::new("\n\n"), "mem").unwrap_err();
        assert!(matches!(err, IngestionError::Empty { .. }));
    }

    #[test]
    fn test_ragged_row() {
        let err = CsvTable::from_reader(Cursor::new("A,B\n1\n"), "mem").unwrap_err();
        assert!(matches!(
            err,
            IngestionError::RowWidth {
                line: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvTable::from_path(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, IngestionError::Io { .. }));
    }
}
