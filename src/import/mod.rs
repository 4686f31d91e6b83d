//! Dynamic schema-inferring ingestion engine
//!
//! Turns arbitrary sheets with user-authored headers into rows in relational
//! tables whose shape is derived at import time: sanitize identifiers, map
//! each sheet to a table, create or reuse that table, then import rows with
//! per-row and per-sheet failure accounting.

pub mod identifier;
pub mod rows;
pub mod schema;
pub mod session;
pub mod sheet;

pub use identifier::{project_name_from_filename, sanitize, table_name_for_sheet};
pub use rows::{normalize, should_import, CellError, NormalizedRow};
pub use schema::{resolve, SchemaResolutionError, TableHandle, FIXED_COLUMNS};
pub use session::{run_import, ImportOptions, ImportReport, SheetResult};
pub use sheet::{import_sheet, SheetStats};
