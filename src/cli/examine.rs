//! Examine command: inspect a workbook's structure without importing

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::import::identifier::{sanitize, scrub, table_name_for_sheet};
use crate::workbook::{WorkbookSource, XlsxWorkbook};

pub fn handle(file: &Path) -> Result<()> {
    let mut workbook = XlsxWorkbook::open(file)?;

    println!("{} {}", "Workbook:".bold(), file.display());

    for sheet_name in workbook.sheet_names() {
        let sheet = match workbook.read_sheet(&sheet_name) {
            Ok(sheet) => sheet,
            Err(e) => {
                println!("\n{} {}", sheet_name.bold(), format!("(unreadable: {e:#})").red());
                continue;
            }
        };

        println!("\n{}", sheet_name.bold());
        println!("  Table:   {}", table_name_for_sheet(&sheet_name).cyan());
        println!("  Rows:    {}", sheet.rows.len());
        println!("  Columns: {}", sheet.headers.len());

        let renamed: Vec<(String, String)> = sheet
            .headers
            .iter()
            .filter(|h| sanitize(h) != scrub(h))
            .map(|h| (h.clone(), sanitize(h)))
            .collect();
        if !renamed.is_empty() {
            println!("  {} reserved or empty headers renamed:", renamed.len());
            for (raw, column) in renamed {
                println!("    {} -> {}", raw.yellow(), column.cyan());
            }
        }
    }

    println!("\n{}", "Rows whose first cell contains 'total' are skipped on import.".dimmed());
    Ok(())
}
