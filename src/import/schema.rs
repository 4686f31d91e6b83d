//! Schema resolution: locate an existing target table or define a new one
//!
//! Resolution happens once per sheet and produces an immutable
//! [`TableHandle`] that the row inserts are bound to. Once a table exists,
//! later imports never alter its column set: headers that don't match an
//! existing column are dropped for that run (schema drift is reported in the
//! log, not treated as an error).

use crate::import::identifier::sanitize;
use crate::store::{Store, StoreError};

/// Fixed columns every target table carries, in addition to one text column
/// per sanitized header. Never populated from sheet data.
pub const FIXED_COLUMNS: [&str; 5] = ["id", "project_id", "user_id", "created_at", "updated_at"];

/// Resolved, immutable description of a target table for one import
/// operation: its name plus the data columns available for inserts, in
/// table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub table_name: String,
    /// Sanitized data column names; fixed linkage columns excluded
    pub columns: Vec<String>,
}

impl TableHandle {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Schema resolution failure. Aborts the whole sheet's import; the
/// orchestrator reports it as a sheet-level error.
#[derive(Debug, Clone)]
pub struct SchemaResolutionError {
    pub table: String,
    pub source: StoreError,
}

impl std::fmt::Display for SchemaResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema resolution failed for table '{}': {}", self.table, self.source)
    }
}

impl std::error::Error for SchemaResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Resolve the target table for a sheet's headers.
///
/// Headers are sanitized in original order and deduplicated keeping the
/// first occurrence; when two distinct headers sanitize to the same
/// identifier, the later one overwrites the earlier in the insert path. If
/// the table already exists the handle binds to its actual column set and no
/// DDL is issued; otherwise the table is created with the fixed columns plus
/// one text column per sanitized header.
pub async fn resolve(
    store: &dyn Store,
    table_name: &str,
    raw_headers: &[String],
) -> Result<TableHandle, SchemaResolutionError> {
    let failed = |source: StoreError| SchemaResolutionError {
        table: table_name.to_string(),
        source,
    };

    let mut candidates: Vec<String> = Vec::new();
    for header in raw_headers {
        let ident = sanitize(header);
        if !candidates.contains(&ident) {
            candidates.push(ident);
        }
    }

    let exists = store.table_exists(table_name).await.map_err(failed)?;

    if exists {
        let all_columns = store.columns_of(table_name).await.map_err(failed)?;
        let columns: Vec<String> = all_columns
            .into_iter()
            .filter(|c| !FIXED_COLUMNS.contains(&c.as_str()))
            .collect();

        for candidate in &candidates {
            if !columns.iter().any(|c| c == candidate) {
                log::warn!(
                    "column '{}' is not in existing table '{}'; its values will be dropped",
                    candidate,
                    table_name
                );
            }
        }
        log::debug!("reusing table '{}' with {} data columns", table_name, columns.len());

        Ok(TableHandle {
            table_name: table_name.to_string(),
            columns,
        })
    } else {
        store
            .create_table(table_name, &candidates)
            .await
            .map_err(failed)?;
        log::info!("created table '{}' with {} data columns", table_name, candidates.len());

        Ok(TableHandle {
            table_name: table_name.to_string(),
            columns: candidates,
        })
    }
}
