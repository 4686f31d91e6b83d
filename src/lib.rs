//! Dynamic Excel import: creates or reuses database tables from sheet
//! structure, then imports rows with per-row and per-sheet failure
//! accounting.

pub mod cli;
pub mod import;
pub mod store;
pub mod workbook;

pub use import::{run_import, ImportOptions, ImportReport, SheetResult};
pub use store::{SqliteStore, Store, StoreError, StoreTransaction};
pub use workbook::{CellValue, Sheet, WorkbookSource, XlsxWorkbook};
