//! In-memory [`DumpSource`] used by the engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::schema::ColumnDescriptor;
use super::traits::{DumpSource, RowVisitor};
use super::value::Row;
use crate::error::{DumpError, Result};

#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub ddl: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row<'static>>,
}

/// Catalog and data held in maps, with a counter of open scans so tests can
/// check that cursors are released on every exit path.
#[derive(Debug, Default)]
pub struct MemorySource {
    databases: Vec<String>,
    tables: HashMap<(String, String), MemoryTable>,
    table_order: Vec<(String, String)>,
    open_scans: Arc<AtomicUsize>,
    unreachable: bool,
}

struct ScanGuard(Arc<AtomicUsize>);

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails with a connection error.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_table(
        mut self,
        database: &str,
        table: &str,
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Row<'static>>,
    ) -> Self {
        if !self.databases.iter().any(|d| d == database) {
            self.databases.push(database.to_string());
        }
        let key = (database.to_string(), table.to_string());
        self.table_order.push(key.clone());
        self.tables.insert(
            key,
            MemoryTable {
                ddl: format!("CREATE TABLE `{}` (...)", table),
                columns,
                rows,
            },
        );
        self
    }

    pub fn with_database(mut self, database: &str) -> Self {
        if !self.databases.iter().any(|d| d == database) {
            self.databases.push(database.to_string());
        }
        self
    }

    pub fn open_scans(&self) -> usize {
        self.open_scans.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(DumpError::connection(
                "connection refused",
                "memory source",
            ));
        }
        Ok(())
    }

    fn table(&self, database: &str, table: &str) -> Result<&MemoryTable> {
        self.tables
            .get(&(database.to_string(), table.to_string()))
            .ok_or_else(|| DumpError::table_not_found(format!("{}.{}", database, table)))
    }
}

#[async_trait]
impl DumpSource for MemorySource {
    async fn create_table_ddl(&self, database: &str, table: &str) -> Result<String> {
        self.check_reachable()?;
        Ok(self.table(database, table)?.ddl.clone())
    }

    async fn create_database_ddl(&self, database: &str) -> Result<String> {
        self.check_reachable()?;
        Ok(format!(
            "CREATE DATABASE /*!32312 IF NOT EXISTS*/ `{}`",
            database
        ))
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        self.check_reachable()?;
        Ok(self.databases.clone())
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        self.check_reachable()?;
        Ok(self
            .table_order
            .iter()
            .filter(|(db, _)| db == database)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn describe_table(&self, database: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.check_reachable()?;
        Ok(self.table(database, table)?.columns.clone())
    }

    async fn scan_table(
        &self,
        database: &str,
        table: &str,
        _columns: &[ColumnDescriptor],
        visit: &mut RowVisitor<'_>,
    ) -> Result<u64> {
        self.check_reachable()?;
        let data = self.table(database, table)?;

        self.open_scans.fetch_add(1, Ordering::SeqCst);
        let _guard = ScanGuard(self.open_scans.clone());

        let mut count = 0;
        for row in &data.rows {
            visit(row.clone())?;
            count += 1;
        }
        Ok(count)
    }

    async fn test_connection(&self) -> Result<()> {
        self.check_reachable()
    }

    fn db_type(&self) -> &str {
        "memory"
    }

    async fn close(&self) {}
}
