//! Import session orchestration
//!
//! Drives one whole workbook: resolves the acting user, creates the owning
//! project record up front, then runs each selected sheet inside its own
//! commit boundary. One sheet failing never rolls back another sheet's
//! already-imported rows; partial imports are a reported outcome, not a
//! failure.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::import::identifier::{project_name_from_filename, table_name_for_sheet};
use crate::import::schema;
use crate::import::sheet::import_sheet;
use crate::store::Store;
use crate::workbook::WorkbookSource;

/// Caller-supplied parameters for one import session
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Original workbook file name; the project name is derived from it
    pub filename: String,
    /// Sheets to import, in the order they should run
    pub selected_sheets: Vec<String>,
    /// Acting user; when absent the store's default user is used
    pub user_id: Option<i64>,
    /// Cooperative cancellation, checked between sheets. Sheets already
    /// committed stay committed; remaining sheets are reported as errored.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Outcome of one sheet's import
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SheetResult {
    pub sheet_name: String,
    pub table_name: String,
    pub rows_seen: usize,
    pub imported: usize,
    pub errors: usize,
    /// Sheet-level failure message; `None` means the sheet ran to commit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final report for one workbook import. Always enumerates every selected
/// sheet, failed ones included; there is no silent partial success.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub project_id: i64,
    pub user_id: i64,
    pub filename: String,
    pub sheets: Vec<SheetResult>,
    pub total_imported: usize,
    pub total_errors: usize,
}

/// Run one workbook import session.
///
/// Fatal (session-level) errors happen only before anything is created: no
/// acting user available, or the project record cannot be committed. After
/// that, every failure is contained at sheet or row granularity and shows up
/// in the report.
pub async fn run_import(
    store: &dyn Store,
    workbook: &mut dyn WorkbookSource,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let user_id = match options.user_id {
        Some(id) => id,
        None => store
            .default_user()
            .await
            .context("Failed to look up a default user")?
            .context("No users available; supply an acting user id")?,
    };

    let project_name = project_name_from_filename(&options.filename);
    let description = format!(
        "Excel import from {} at {}",
        options.filename,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    // Committed immediately so every sheet references a valid project even
    // if later sheets fail.
    let project_id = store
        .create_project(&project_name, &description)
        .await
        .context("Failed to create project record")?;
    log::info!("created project '{}' (id {})", project_name, project_id);

    let mut sheets = Vec::new();
    for sheet_name in &options.selected_sheets {
        let table_name = table_name_for_sheet(sheet_name);

        if let Some(cancel) = &options.cancel {
            if cancel.load(Ordering::Relaxed) {
                sheets.push(SheetResult {
                    sheet_name: sheet_name.clone(),
                    table_name,
                    rows_seen: 0,
                    imported: 0,
                    errors: 0,
                    error: Some("import cancelled before this sheet ran".to_string()),
                });
                continue;
            }
        }

        let result =
            import_one_sheet(store, workbook, sheet_name, &table_name, project_id, user_id).await;
        sheets.push(match result {
            Ok(result) => result,
            Err(message) => {
                log::error!("sheet '{}' failed: {}", sheet_name, message);
                SheetResult {
                    sheet_name: sheet_name.clone(),
                    table_name,
                    rows_seen: 0,
                    imported: 0,
                    errors: 0,
                    error: Some(message),
                }
            }
        });
    }

    let total_imported = sheets.iter().map(|s| s.imported).sum();
    let total_errors = sheets.iter().map(|s| s.errors).sum();

    Ok(ImportReport {
        project_id,
        user_id,
        filename: options.filename.clone(),
        sheets,
        total_imported,
        total_errors,
    })
}

/// One sheet, one commit boundary. Any failure here is a sheet-level error:
/// nothing from this sheet is persisted, other sheets are unaffected.
async fn import_one_sheet(
    store: &dyn Store,
    workbook: &mut dyn WorkbookSource,
    sheet_name: &str,
    table_name: &str,
    project_id: i64,
    user_id: i64,
) -> Result<SheetResult, String> {
    let sheet = workbook
        .read_sheet(sheet_name)
        .map_err(|e| format!("failed to read sheet: {e:#}"))?;

    let handle = schema::resolve(store, table_name, &sheet.headers)
        .await
        .map_err(|e| e.to_string())?;

    let mut tx = store.begin().await.map_err(|e| e.to_string())?;
    let stats = import_sheet(&mut *tx, &sheet, &handle, project_id, user_id).await;
    tx.commit().await.map_err(|e| e.to_string())?;

    Ok(SheetResult {
        sheet_name: sheet_name.to_string(),
        table_name: table_name.to_string(),
        rows_seen: stats.rows_seen,
        imported: stats.imported,
        errors: stats.errors,
        error: None,
    })
}
