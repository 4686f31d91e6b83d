//! Row filtering and normalization
//!
//! Decides, row by row, whether a row is data or noise, and converts cells
//! to storage-safe text. Summary rows ("Total ...") and rows that carry no
//! usable data are skipped; skips are neither imports nor errors.

use crate::import::identifier::sanitize;
use crate::import::schema::TableHandle;
use crate::workbook::CellValue;

/// A cell that could not be coerced to a storable value
#[derive(Debug, Clone)]
pub struct CellError {
    pub column: String,
    pub message: String,
}

impl std::fmt::Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.column, self.message)
    }
}

impl std::error::Error for CellError {}

/// One row normalized against a resolved table: column/value pairs in table
/// order, restricted to columns the table actually has. `None` is an
/// explicit NULL.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRow {
    pub values: Vec<(String, Option<String>)>,
}

impl NormalizedRow {
    /// Whether any data column received a value. Rows where nothing besides
    /// the linkage columns would be populated are not worth importing.
    pub fn has_data(&self) -> bool {
        self.values.iter().any(|(_, v)| v.is_some())
    }
}

/// Whether a row is data rather than noise. Rows whose first cell contains
/// "total" (case-insensitive) are summary rows appended by the spreadsheet
/// author and never imported.
pub fn should_import(row: &[CellValue]) -> bool {
    match row.first() {
        Some(first) => !first.as_text().to_lowercase().contains("total"),
        None => true,
    }
}

/// Normalize one row against the resolved table.
///
/// Cells are rendered to storage text (dates as `YYYY-MM-DD HH:MM:SS`,
/// empties as explicit NULL). Headers whose sanitized identifier is not a
/// column of the table are dropped. When two headers sanitize to the same
/// identifier, the later one's value wins.
pub fn normalize(
    headers: &[String],
    row: &[CellValue],
    handle: &TableHandle,
) -> Result<NormalizedRow, CellError> {
    let mut values: Vec<(String, Option<String>)> = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        let ident = sanitize(header);
        if !handle.has_column(&ident) {
            log::debug!(
                "dropping header '{}' ('{}'): not a column of '{}'",
                header,
                ident,
                handle.table_name
            );
            continue;
        }

        let cell = row.get(idx).unwrap_or(&CellValue::Null);
        if let CellValue::Float(f) = cell {
            if !f.is_finite() {
                return Err(CellError {
                    column: ident,
                    message: format!("unrepresentable numeric value {}", f),
                });
            }
        }
        let text = cell.to_storage_text();

        match values.iter().position(|(column, _)| column == &ident) {
            Some(pos) => values[pos].1 = text,
            None => values.push((ident, text)),
        }
    }

    Ok(NormalizedRow { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(columns: &[&str]) -> TableHandle {
        TableHandle {
            table_name: "project_test".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_total_rows_are_skipped() {
        let row = vec![CellValue::Text("Total Labor".into()), CellValue::Null];
        assert!(!should_import(&row));

        let row = vec![CellValue::Text("GRAND TOTAL".into())];
        assert!(!should_import(&row));

        let row = vec![CellValue::Text("Conduit".into()), CellValue::Float(4.0)];
        assert!(should_import(&row));
    }

    #[test]
    fn test_empty_first_cell_does_not_skip() {
        let row = vec![CellValue::Null, CellValue::Text("x".into())];
        assert!(should_import(&row));
        assert!(should_import(&[]));
    }

    #[test]
    fn test_normalize_keeps_only_table_columns() {
        let headers = vec!["Description".to_string(), "Extra".to_string()];
        let row = vec![
            CellValue::Text("wire".into()),
            CellValue::Text("dropped".into()),
        ];
        let normalized = normalize(&headers, &row, &handle(&["description"])).unwrap();
        assert_eq!(
            normalized.values,
            vec![("description".to_string(), Some("wire".to_string()))]
        );
    }

    #[test]
    fn test_colliding_headers_later_value_wins() {
        let headers = vec!["Rate $".to_string(), "Rate %".to_string()];
        let row = vec![
            CellValue::Text("first".into()),
            CellValue::Text("second".into()),
        ];
        assert_eq!(sanitize("Rate $"), sanitize("Rate %"));

        let normalized = normalize(&headers, &row, &handle(&["rate"])).unwrap();
        assert_eq!(
            normalized.values,
            vec![("rate".to_string(), Some("second".to_string()))]
        );
    }

    #[test]
    fn test_blank_row_has_no_data() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let row = vec![CellValue::Null, CellValue::Text(String::new())];
        let normalized = normalize(&headers, &row, &handle(&["a", "b"])).unwrap();
        assert!(!normalized.has_data());
    }

    #[test]
    fn test_empty_cells_are_null_not_empty_string() {
        let headers = vec!["A".to_string()];
        let normalized = normalize(&headers, &[CellValue::Null], &handle(&["a"])).unwrap();
        assert_eq!(normalized.values, vec![("a".to_string(), None)]);
    }

    #[test]
    fn test_non_finite_float_is_a_cell_error() {
        let headers = vec!["Qty".to_string()];
        let row = vec![CellValue::Float(f64::NAN)];
        let err = normalize(&headers, &row, &handle(&["qty"])).unwrap_err();
        assert_eq!(err.column, "qty");
    }

    #[test]
    fn test_short_row_pads_with_nulls() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let row = vec![CellValue::Text("x".into())];
        let normalized = normalize(&headers, &row, &handle(&["a", "b"])).unwrap();
        assert_eq!(
            normalized.values,
            vec![
                ("a".to_string(), Some("x".to_string())),
                ("b".to_string(), None)
            ]
        );
    }
}
