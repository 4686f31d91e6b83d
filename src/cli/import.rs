//! Import command: run an import session and print the report

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::import::{run_import, ImportOptions, ImportReport};
use crate::store::SqliteStore;
use crate::workbook::{WorkbookSource, XlsxWorkbook};

pub async fn handle(
    database_url: &str,
    file: &Path,
    sheets: &[String],
    user_id: Option<i64>,
    json: bool,
) -> Result<()> {
    let store = SqliteStore::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", database_url))?;

    let mut workbook = XlsxWorkbook::open(file)?;

    let selected_sheets = if sheets.is_empty() {
        workbook.sheet_names()
    } else {
        sheets.to_vec()
    };

    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let options = ImportOptions {
        filename,
        selected_sheets,
        user_id,
        cancel: None,
    };

    let report = run_import(&store, &mut workbook, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("{}", "Import complete".bold());
    println!("  Project id: {}", report.project_id);
    println!("  User id:    {}", report.user_id);
    println!();

    for sheet in &report.sheets {
        match &sheet.error {
            Some(message) => {
                println!(
                    "  {} -> {}: {}",
                    sheet.sheet_name.bold(),
                    sheet.table_name.cyan(),
                    format!("failed: {}", message).red()
                );
            }
            None => {
                let errors = if sheet.errors > 0 {
                    format!("{} errors", sheet.errors).red().to_string()
                } else {
                    "0 errors".green().to_string()
                };
                println!(
                    "  {} -> {}: {} rows seen, {} imported, {}",
                    sheet.sheet_name.bold(),
                    sheet.table_name.cyan(),
                    sheet.rows_seen,
                    sheet.imported.to_string().green(),
                    errors
                );
            }
        }
    }

    println!();
    println!(
        "  Total: {} imported, {} errors",
        report.total_imported.to_string().green(),
        report.total_errors
    );
}
