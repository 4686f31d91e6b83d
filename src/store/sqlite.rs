//! SQLite implementation of the store interface

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RowValues, Store, StoreError, StoreTransaction};

/// SQLite-backed store over an sqlx connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn store_err(operation: &str) -> impl Fn(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::new(operation, e.to_string())
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL and make sure the fixed business tables
    /// (`users`, `projects`) the linkage columns reference are present.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(store_err("connect to database"))?;
        let store = Self::new(pool);
        store.ensure_base_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the fixed `users` and `projects` tables if missing. These are
    /// ordinary ahead-of-time tables, not import targets; they exist so the
    /// linkage columns on import tables have something to reference.
    pub async fn ensure_base_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 username TEXT NOT NULL UNIQUE,
                 email TEXT UNIQUE,
                 full_name TEXT,
                 role TEXT NOT NULL DEFAULT 'user',
                 is_active INTEGER NOT NULL DEFAULT 1,
                 created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                 updated_at TEXT
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err("create users table"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS projects (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL,
                 description TEXT,
                 status TEXT NOT NULL DEFAULT 'active',
                 created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                 updated_at TEXT
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err("create projects table"))?;

        Ok(())
    }

    /// Insert a user row. Not part of the ingestion path; used by callers
    /// that need an acting user in a fresh database.
    pub async fn create_user(&self, username: &str, email: &str) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO users (username, email) VALUES (?, ?)")
            .bind(username)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(store_err("create user"))?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err("check table existence"))?;
        Ok(row.is_some())
    }

    async fn columns_of(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                .bind(name)
                .fetch_all(&self.pool)
                .await
                .map_err(store_err("introspect table columns"))?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn create_table(&self, name: &str, data_columns: &[String]) -> Result<(), StoreError> {
        // Identifiers can't be bound as parameters; by the time a name
        // reaches the store it has been sanitized down to [a-z0-9_].
        let mut ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 project_id INTEGER NOT NULL REFERENCES projects(id),
                 user_id INTEGER NOT NULL REFERENCES users(id),
                 created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                 updated_at TEXT",
            name
        );
        for column in data_columns {
            ddl.push_str(&format!(",\n                 {} TEXT", column));
        }
        ddl.push_str("\n             )");

        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(store_err("create table"))?;
        Ok(())
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<i64, StoreError> {
        let result =
            sqlx::query("INSERT INTO projects (name, description, status) VALUES (?, ?, 'active')")
                .bind(name)
                .bind(description)
                .execute(&self.pool)
                .await
                .map_err(store_err("create project"))?;
        Ok(result.last_insert_rowid())
    }

    async fn default_user(&self) -> Result<Option<i64>, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("look up default user"))?;
        Ok(row.map(|(id,)| id))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("begin transaction"))?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn insert(
        &mut self,
        table: &str,
        project_id: i64,
        user_id: i64,
        values: &RowValues,
    ) -> Result<(), StoreError> {
        let mut columns = String::from("project_id, user_id");
        let mut placeholders = String::from("?, ?");
        for (column, _) in values {
            columns.push_str(", ");
            columns.push_str(column);
            placeholders.push_str(", ?");
        }
        let sql = format!("INSERT INTO {} ({}) VALUES ({})", table, columns, placeholders);

        let mut query = sqlx::query(&sql).bind(project_id).bind(user_id);
        for (_, value) in values {
            query = query.bind(value.as_deref());
        }
        query
            .execute(&mut *self.tx)
            .await
            .map_err(store_err("insert row"))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(store_err("commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(store_err("rollback transaction"))
    }
}
