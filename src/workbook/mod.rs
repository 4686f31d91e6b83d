//! Workbook reading
//!
//! Thin wrapper over the external spreadsheet reader. A [`Sheet`] is the raw
//! tabular frame the ingestion pipeline works on: a header row plus data
//! rows of [`CellValue`]s. The [`WorkbookSource`] trait is the seam between
//! the orchestrator and the file format, so tests can feed sheets in from
//! memory.

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A cell value as read from a workbook
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty or unreadable cell
    Null,
    /// String value
    Text(String),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Render the cell for storage. Empty cells become an explicit absence,
    /// never an empty string, so downstream queries can tell "no data" from
    /// "zero-length text". Dates render as `YYYY-MM-DD HH:MM:SS`; whole
    /// floats render without a fractional part.
    pub fn to_storage_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some((*f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Text rendering with empty cells as `""`, for headers and filter checks.
    pub fn as_text(&self) -> String {
        self.to_storage_text().unwrap_or_default()
    }

    /// Check if this cell is empty
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Null,
            Data::String(s) if s.is_empty() => CellValue::Null,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Null),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Null,
        }
    }
}

/// One tab of tabular data: a header row plus zero or more data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name as authored in the workbook
    pub name: String,
    /// Header labels in original order; may repeat or be empty
    pub headers: Vec<String>,
    /// Data rows in sheet order
    pub rows: Vec<Vec<CellValue>>,
}

/// Source of sheets for one import operation.
///
/// `read_sheet` takes `&mut self` because file-backed readers seek.
pub trait WorkbookSource {
    /// Names of all sheets in the workbook, in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet as a raw tabular frame
    fn read_sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// An .xlsx workbook opened from disk
pub struct XlsxWorkbook {
    workbook: Xlsx<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let workbook: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
        Ok(Self { workbook })
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let range = self
            .workbook
            .worksheet_range(name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|c| CellValue::from(c).as_text()).collect())
            .unwrap_or_default();

        let rows: Vec<Vec<CellValue>> = rows
            .map(|r| r.iter().map(CellValue::from).collect())
            .collect();

        Ok(Sheet {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}
