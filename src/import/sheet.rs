//! Batch import of one sheet
//!
//! Iterates a sheet's rows in order, applying the skip rules and inserting
//! each surviving row as one record. A failed row is counted and logged,
//! never fatal for the sheet; commit timing belongs to the orchestrator.

use crate::import::rows::{normalize, should_import};
use crate::import::schema::TableHandle;
use crate::store::StoreTransaction;
use crate::workbook::Sheet;

/// Per-sheet accounting under partial failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Data rows present in the sheet
    pub rows_seen: usize,
    /// Rows successfully staged for insert
    pub imported: usize,
    /// Rows that failed normalization or insert
    pub errors: usize,
}

/// Import one sheet's rows into its resolved target table.
///
/// Rows failing the skip rules (summary rows, rows with no usable data) are
/// passed over silently; rows failing coercion or insert increment the error
/// count and processing continues.
pub async fn import_sheet(
    tx: &mut dyn StoreTransaction,
    sheet: &Sheet,
    handle: &TableHandle,
    project_id: i64,
    user_id: i64,
) -> SheetStats {
    let mut stats = SheetStats::default();

    for (idx, row) in sheet.rows.iter().enumerate() {
        stats.rows_seen += 1;

        if !should_import(row) {
            log::debug!("skipping summary row {} of sheet '{}'", idx, sheet.name);
            continue;
        }

        let normalized = match normalize(&sheet.headers, row, handle) {
            Ok(normalized) => normalized,
            Err(e) => {
                stats.errors += 1;
                log::warn!("row {} of sheet '{}' failed to normalize: {}", idx, sheet.name, e);
                continue;
            }
        };

        if !normalized.has_data() {
            log::debug!("skipping row {} of sheet '{}': no usable data", idx, sheet.name);
            continue;
        }

        match tx
            .insert(&handle.table_name, project_id, user_id, &normalized.values)
            .await
        {
            Ok(()) => stats.imported += 1,
            Err(e) => {
                stats.errors += 1;
                log::warn!("insert failed for row {} of sheet '{}': {}", idx, sheet.name, e);
            }
        }
    }

    log::info!(
        "sheet '{}': {} rows seen, {} imported, {} errors",
        sheet.name,
        stats.rows_seen,
        stats.imported,
        stats.errors
    );
    stats
}
