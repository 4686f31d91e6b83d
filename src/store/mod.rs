//! Relational store capability consumed by the ingestion engine
//!
//! The engine never owns the database: it asks a [`Store`] whether a table
//! exists, what its columns are, to create a table, and for a transaction to
//! insert rows into. The SQLite implementation lives in [`sqlite`]; tests
//! drive the engine against an in-memory implementation.

pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// Failure from the relational store, carrying the operation that failed.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub operation: String,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Column name/value pairs for one row, in table-column order. `None` is an
/// explicit SQL NULL.
pub type RowValues = [(String, Option<String>)];

/// The relational store interface: catalog queries, DDL, and transaction
/// boundaries. Fixed linkage columns (`id`, `project_id`, `user_id`,
/// `created_at`, `updated_at`) are the implementation's responsibility;
/// callers only supply the data columns.
#[async_trait]
pub trait Store: Send + Sync {
    /// Whether a table of this name already exists
    async fn table_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Ordered column names of an existing table, fixed columns included
    async fn columns_of(&self, name: &str) -> Result<Vec<String>, StoreError>;

    /// Create a table with the fixed linkage columns plus one text column
    /// per data column. Must be create-if-not-exists so concurrent imports
    /// racing on the same table name degrade to redundant checks.
    async fn create_table(&self, name: &str, data_columns: &[String]) -> Result<(), StoreError>;

    /// Create and immediately commit one owning project record, returning
    /// its id
    async fn create_project(&self, name: &str, description: &str) -> Result<i64, StoreError>;

    /// Id of a user to own the import when the caller didn't supply one
    async fn default_user(&self) -> Result<Option<i64>, StoreError>;

    /// Open a transaction for one sheet's inserts
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
}

/// One sheet's insert transaction. Dropped without commit, staged rows are
/// discarded.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Insert one row carrying the linkage values plus normalized columns
    async fn insert(
        &mut self,
        table: &str,
        project_id: i64,
        user_id: i64,
        values: &RowValues,
    ) -> Result<(), StoreError>;

    /// Commit everything staged in this transaction
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard everything staged in this transaction
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
