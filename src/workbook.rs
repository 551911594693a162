//! Spreadsheet input and output
//!
//! Every stage exchanges data as a single-sheet `.xlsx` workbook whose first
//! row holds the column names. [`Table`] is the in-memory form.

use crate::models::ReviewRecord;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Text view of the cell; numbers and dates are rendered, empty is `None`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn from_text(text: Option<String>) -> Self {
        text.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("File {0} not found")]
    NotFound(String),

    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Column `{column}` not found; available columns: {available}")]
    MissingColumn { column: String, available: String },

    #[error("Workbook {0} has no worksheets")]
    NoSheets(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, WorkbookError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| WorkbookError::MissingColumn {
                column: name.to_string(),
                available: self.headers.join(", "),
            })
    }

    /// Text values of one column; short rows read as missing
    pub fn text_column(&self, index: usize) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.get(index).and_then(Cell::as_text))
            .collect()
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= col {
                r.resize(col + 1, Cell::Empty);
            }
            r[col] = cell;
        }
    }

    /// Append a column, padding or truncating `cells` to the row count
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) {
        let width = self.headers.len();
        self.headers.push(name.to_string());
        let mut cells = cells.into_iter();
        for row in &mut self.rows {
            row.resize(width, Cell::Empty);
            row.push(cells.next().unwrap_or(Cell::Empty));
        }
    }

    /// Keep only the rows at `indices`, in that order
    pub fn retain_rows(&mut self, indices: &[usize]) {
        let rows = std::mem::take(&mut self.rows);
        let mut slots: Vec<Option<Vec<Cell>>> = rows.into_iter().map(Some).collect();
        self.rows = indices
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();
    }
}

impl From<&[ReviewRecord]> for Table {
    fn from(records: &[ReviewRecord]) -> Self {
        let mut table = Table::new(vec![
            "rating".to_string(),
            "publication_date".to_string(),
            "review".to_string(),
        ]);
        table.rows = records
            .iter()
            .map(|r| {
                vec![
                    r.rating.map(Cell::Number).unwrap_or(Cell::Empty),
                    r.publication_date.map(Cell::Date).unwrap_or(Cell::Empty),
                    Cell::from_text(r.review_text.clone()),
                ]
            })
            .collect();
        table
    }
}

/// Read the first worksheet of a workbook
pub fn read_table(path: &Path) -> Result<Table, WorkbookError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(WorkbookError::NotFound(display));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| WorkbookError::Read {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WorkbookError::NoSheets(display.clone()))?
        .map_err(|e| WorkbookError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| cell_from_data(c).as_text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let mut table = Table::new(headers);
    table.rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    log::debug!("Read {} rows from {}", table.len(), display);
    Ok(table)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| Cell::Date(dt.date()))
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => crate::reviews::parse_publication_date(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// Write a table to a single-sheet workbook, creating parent directories
pub fn write_table(path: &Path, table: &Table) -> Result<(), WorkbookError> {
    let display = path.display().to_string();
    let write_err = |e: &dyn std::fmt::Display| WorkbookError::Write {
        path: display.clone(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(&e))?;
    }

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, header)
            .map_err(|e| write_err(&e))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(excel_row, col, s).map_err(|e| write_err(&e))?;
                }
                Cell::Number(n) => {
                    sheet.write_number(excel_row, col, *n).map_err(|e| write_err(&e))?;
                }
                Cell::Date(d) => {
                    let date = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)
                        .map_err(|e| write_err(&e))?;
                    sheet
                        .write_datetime_with_format(excel_row, col, &date, &date_format)
                        .map_err(|e| write_err(&e))?;
                }
            }
        }
    }

    workbook.save(path).map_err(|e| write_err(&e))?;
    log::info!("Wrote {} rows to {}", table.len(), display);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["comments".to_string(), "score".to_string()]);
        table.rows = vec![
            vec![Cell::Text("a".into()), Cell::Number(1.0)],
            vec![Cell::Text("b".into())],
            vec![Cell::Empty, Cell::Number(3.0)],
        ];
        table
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column_index("score").unwrap(), 1);
        let err = table.column_index("review").unwrap_err();
        assert!(err.to_string().contains("comments, score"));
    }

    #[test]
    fn test_text_column_handles_short_rows() {
        let table = sample();
        assert_eq!(
            table.text_column(1),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn test_push_column_pads_rows() {
        let mut table = sample();
        table.push_column("label", vec![Cell::Text("x".into())]);
        assert_eq!(table.headers.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1][1], Cell::Empty);
        assert_eq!(table.rows[2][2], Cell::Empty);
    }

    #[test]
    fn test_retain_rows() {
        let mut table = sample();
        table.retain_rows(&[2, 0]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Empty);
        assert_eq!(table.rows[1][0], Cell::Text("a".into()));
    }

    #[test]
    fn test_review_table_shape() {
        let records = vec![
            ReviewRecord {
                review_text: Some("nice".into()),
                rating: Some(4.0),
                publication_date: NaiveDate::from_ymd_opt(2023, 5, 14),
            },
            ReviewRecord::default(),
        ];
        let table = Table::from(records.as_slice());
        assert_eq!(table.headers, vec!["rating", "publication_date", "review"]);
        assert_eq!(table.rows[1], vec![Cell::Empty, Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reviews.xlsx");
        let records = vec![
            ReviewRecord {
                review_text: Some("nice".into()),
                rating: Some(4.0),
                publication_date: NaiveDate::from_ymd_opt(2023, 5, 14),
            },
            ReviewRecord {
                review_text: Some("meh".into()),
                rating: None,
                publication_date: None,
            },
        ];
        write_table(&path, &Table::from(records.as_slice())).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["rating", "publication_date", "review"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Number(4.0));
        assert_eq!(table.rows[0][1], Cell::Date(NaiveDate::from_ymd_opt(2023, 5, 14).unwrap()));
        assert_eq!(table.rows[0][2], Cell::Text("nice".into()));
        assert_eq!(table.rows[1][0], Cell::Empty);
        assert_eq!(table.rows[1][1], Cell::Empty);
        assert_eq!(table.rows[1][2], Cell::Text("meh".into()));
    }

    #[test]
    fn test_missing_file() {
        let err = read_table(Path::new("/no/such/comments.xlsx")).unwrap_err();
        assert!(matches!(err, WorkbookError::NotFound(_)));
    }
}
