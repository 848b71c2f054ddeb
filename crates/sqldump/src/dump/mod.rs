//! Per-table dump driver.
//!
//! [`DumpDriver`] turns one table into statements: the catalog's CREATE TABLE
//! text, then one INSERT per row in scan order. Rows are serialized and
//! emitted as they arrive; a table is never buffered in memory.

mod sink;

pub use sink::{StatementSink, WriterSink};

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::core::identifier::quote_mysql;
use crate::core::traits::DumpSource;
use crate::core::value::Row;
use crate::encode::serialize_row;
use crate::error::Result;

/// What to emit besides the INSERT statements.
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions {
    /// Emit the CREATE TABLE statement before the rows.
    pub include_ddl: bool,
    /// Emit CREATE DATABASE before the USE statement of each database.
    pub create_database: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_ddl: true,
            create_database: false,
        }
    }
}

/// Outcome of one table dump.
#[derive(Debug, Clone)]
pub struct TableDump {
    pub database: String,
    pub table: String,
    /// INSERT statements emitted.
    pub rows: u64,
    pub duration: Duration,
}

/// Streams tables from a [`DumpSource`] into a [`StatementSink`].
pub struct DumpDriver<'a, S: DumpSource + ?Sized> {
    source: &'a S,
    options: DumpOptions,
}

impl<'a, S: DumpSource + ?Sized> DumpDriver<'a, S> {
    pub fn new(source: &'a S, options: DumpOptions) -> Self {
        Self { source, options }
    }

    /// Emit the database preamble: optional CREATE DATABASE, then USE.
    pub async fn begin_database<K: StatementSink + ?Sized>(
        &self,
        database: &str,
        sink: &mut K,
    ) -> Result<()> {
        if self.options.create_database {
            let ddl = self.source.create_database_ddl(database).await?;
            sink.emit(&format!("{};", ddl))?;
        }
        sink.emit(&format!("USE {};", quote_mysql(database)?))
    }

    /// Dump one table: DDL (if enabled), then every row as an INSERT.
    ///
    /// Any failure fails the whole table. Statements already emitted stay
    /// emitted, but a row that fails to encode never produces output.
    pub async fn dump_table<K: StatementSink + ?Sized>(
        &self,
        database: &str,
        table: &str,
        sink: &mut K,
    ) -> Result<TableDump> {
        let start = Instant::now();

        if self.options.include_ddl {
            let ddl = self.source.create_table_ddl(database, table).await?;
            sink.emit(&format!("{};", ddl))?;
        }

        let columns = self.source.describe_table(database, table).await?;
        debug!("{}.{}: {} columns", database, table, columns.len());

        let mut visit = |row: Row<'_>| -> Result<()> {
            let statement = serialize_row(table, &columns, &row)?;
            sink.emit(&statement)
        };
        let rows = self
            .source
            .scan_table(database, table, &columns, &mut visit)
            .await?;

        let duration = start.elapsed();
        info!(
            "Dumped {}.{}: {} rows in {:.2}s",
            database,
            table,
            rows,
            duration.as_secs_f64()
        );

        Ok(TableDump {
            database: database.to_string(),
            table: table.to_string(),
            rows,
            duration,
        })
    }

    /// Dump a database: preamble, then each table in order.
    ///
    /// Stops at the first failing table.
    pub async fn dump_database<K: StatementSink + ?Sized>(
        &self,
        database: &str,
        tables: &[String],
        sink: &mut K,
    ) -> Result<Vec<TableDump>> {
        self.begin_database(database, sink).await?;

        let mut dumps = Vec::with_capacity(tables.len());
        for table in tables {
            dumps.push(self.dump_table(database, table, sink).await?);
        }
        Ok(dumps)
    }
}
