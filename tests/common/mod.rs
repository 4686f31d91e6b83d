//! Shared test doubles: an in-memory store and an in-memory workbook source

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use excel_import::store::{RowValues, Store, StoreError, StoreTransaction};
use excel_import::workbook::{CellValue, Sheet, WorkbookSource};

/// One row as persisted by the in-memory store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub project_id: i64,
    pub user_id: i64,
    pub values: Vec<(String, Option<String>)>,
}

#[derive(Default)]
struct Inner {
    /// table name -> data columns (fixed columns implied)
    tables: BTreeMap<String, Vec<String>>,
    rows: BTreeMap<String, Vec<StoredRow>>,
    projects: Vec<(i64, String, String)>,
    users: Vec<i64>,
    /// tables whose catalog operations fail, simulating a store outage
    unreachable_tables: HashSet<String>,
    /// inserts fail when any value equals this marker
    poison_value: Option<String>,
}

/// In-memory store with failure injection for outage and bad-row scenarios
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: i64) {
        self.inner.lock().unwrap().users.push(id);
    }

    /// Make catalog operations for one table fail
    pub fn set_unreachable(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .unreachable_tables
            .insert(table.to_string());
    }

    /// Make inserts fail whenever a row carries this value
    pub fn set_poison_value(&self, value: &str) {
        self.inner.lock().unwrap().poison_value = Some(value.to_string());
    }

    pub fn rows_in(&self, table: &str) -> Vec<StoredRow> {
        self.inner
            .lock()
            .unwrap()
            .rows
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn data_columns_of(&self, table: &str) -> Option<Vec<String>> {
        self.inner.lock().unwrap().tables.get(table).cloned()
    }

    pub fn projects(&self) -> Vec<(i64, String, String)> {
        self.inner.lock().unwrap().projects.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable_tables.contains(name) {
            return Err(StoreError::new("check table existence", "store unreachable"));
        }
        Ok(inner.tables.contains_key(name))
    }

    async fn columns_of(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable_tables.contains(name) {
            return Err(StoreError::new("introspect table columns", "store unreachable"));
        }
        let data = inner
            .tables
            .get(name)
            .ok_or_else(|| StoreError::new("introspect table columns", "no such table"))?;
        let mut columns: Vec<String> = ["id", "project_id", "user_id", "created_at", "updated_at"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(data.iter().cloned());
        Ok(columns)
    }

    async fn create_table(&self, name: &str, data_columns: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable_tables.contains(name) {
            return Err(StoreError::new("create table", "store unreachable"));
        }
        // create-if-not-exists: an existing definition is left untouched
        inner
            .tables
            .entry(name.to_string())
            .or_insert_with(|| data_columns.to_vec());
        Ok(())
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.projects.len() as i64 + 1;
        inner
            .projects
            .push((id, name.to_string(), description.to_string()));
        Ok(id)
    }

    async fn default_user(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().unwrap().users.first().copied())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    inner: Arc<Mutex<Inner>>,
    staged: Vec<(String, StoredRow)>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert(
        &mut self,
        table: &str,
        project_id: i64,
        user_id: i64,
        values: &RowValues,
    ) -> Result<(), StoreError> {
        let poison = self.inner.lock().unwrap().poison_value.clone();
        if let Some(poison) = poison {
            if values.iter().any(|(_, v)| v.as_deref() == Some(poison.as_str())) {
                return Err(StoreError::new("insert row", "constraint violation"));
            }
        }
        self.staged.push((
            table.to_string(),
            StoredRow {
                project_id,
                user_id,
                values: values.to_vec(),
            },
        ));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        for (table, row) in self.staged {
            inner.rows.entry(table).or_default().push(row);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory workbook source
#[derive(Default)]
pub struct MemoryWorkbook {
    pub sheets: Vec<Sheet>,
    pub unreadable: HashSet<String>,
}

impl MemoryWorkbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            sheets,
            unreadable: HashSet::new(),
        }
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        if self.unreadable.contains(name) {
            bail!("sheet '{}' is corrupt", name);
        }
        match self.sheets.iter().find(|s| s.name == name) {
            Some(sheet) => Ok(sheet.clone()),
            None => bail!("no sheet named '{}'", name),
        }
    }
}

pub fn sheet(name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> Sheet {
    Sheet {
        name: name.to_string(),
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}
