//! The data-source seam.
//!
//! [`DumpSource`] is everything the dump engine needs from a database:
//! verbatim DDL from the catalog, table and column listings, and a
//! full-table scan that hands rows to a visitor one at a time.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::ColumnDescriptor;
use super::value::Row;

/// Callback receiving each scanned row.
///
/// The row may borrow from the driver's buffer and is only valid for the
/// duration of the call. Returning an error stops the scan.
pub type RowVisitor<'a> = dyn for<'r> FnMut(Row<'r>) -> Result<()> + Send + 'a;

/// Read schema and data from a source database.
///
/// All methods are read-only. Implementations must release any cursor or
/// pooled connection on every exit path, including visitor errors.
#[async_trait]
pub trait DumpSource: Send + Sync {
    /// `SHOW CREATE TABLE`: the catalog's DDL text for a table, unmodified.
    ///
    /// Fails with `DumpError::NotFound` when the table does not exist.
    async fn create_table_ddl(&self, database: &str, table: &str) -> Result<String>;

    /// `SHOW CREATE DATABASE IF NOT EXISTS`: the catalog's DDL text for a
    /// database, unmodified.
    async fn create_database_ddl(&self, database: &str) -> Result<String>;

    /// All database names visible to the current credentials, in catalog order.
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Base tables of a database.
    async fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// Columns of a table in ordinal order.
    ///
    /// Fails with `DumpError::NotFound` when the table does not exist.
    async fn describe_table(&self, database: &str, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Full-table scan without filtering or ordering.
    ///
    /// Each row is decoded against `columns` and passed to `visit` before the
    /// next row is fetched. Returns the number of rows visited.
    async fn scan_table(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDescriptor],
        visit: &mut RowVisitor<'_>,
    ) -> Result<u64>;

    /// Round-trip a trivial query.
    async fn test_connection(&self) -> Result<()>;

    /// Get the database type identifier (e.g., "mysql").
    fn db_type(&self) -> &str;

    /// Close the connection pool.
    async fn close(&self);
}
