//! MySQL/MariaDB source reader implementation.
//!
//! Implements the `DumpSource` trait on top of an SQLx connection pool.
//! Catalog metadata comes from `SHOW` statements and `INFORMATION_SCHEMA`;
//! table scans use the text protocol so every cell arrives exactly as the
//! server renders it.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{
    MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode,
};
use sqlx::{Executor, Row, ValueRef};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::identifier::{qualify_mysql, quote_mysql};
use crate::core::schema::{ColumnDescriptor, SourceType, TypeFamily};
use crate::core::traits::{DumpSource, RowVisitor};
use crate::core::value::{RawValue, Row as DumpRow};
use crate::error::{DumpError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// `ER_BAD_DB_ERROR`: unknown database.
const ER_BAD_DB_ERROR: u16 = 1049;
/// `ER_NO_SUCH_TABLE`: table does not exist.
const ER_NO_SUCH_TABLE: u16 = 1146;

/// Columns in ordinal order, limited to the ones `SELECT *` returns.
///
/// CAST to CHAR handles collation differences where information_schema may
/// return VARBINARY. INVISIBLE columns (MySQL 8.0.23+, MariaDB 10.3+) are
/// left out of `SELECT *`, so they are left out here too.
const DESCRIBE_COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(DATA_TYPE AS CHAR(255)) AS DATA_TYPE
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
      AND EXTRA NOT LIKE '%INVISIBLE%'
    ORDER BY ORDINAL_POSITION
"#;

/// MySQL/MariaDB source reader implementation.
pub struct MysqlReader {
    pool: MySqlPool,
}

impl MysqlReader {
    /// Create a new MySQL reader from configuration.
    pub async fn new(config: &SourceConfig, max_conns: u32) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(Self::ssl_mode(&config.ssl_mode)?);
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(max_conns)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| DumpError::connection(e, "creating MySQL source pool"))?;

        let reader = Self { pool };
        reader.test_connection().await?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(reader)
    }

    fn ssl_mode(mode: &str) -> Result<MySqlSslMode> {
        match mode.to_lowercase().as_str() {
            "disabled" => Ok(MySqlSslMode::Disabled),
            "preferred" => Ok(MySqlSslMode::Preferred),
            "required" => Ok(MySqlSslMode::Required),
            "verify_ca" => Ok(MySqlSslMode::VerifyCa),
            "verify_identity" => Ok(MySqlSslMode::VerifyIdentity),
            other => Err(DumpError::Config(format!("unknown ssl_mode '{}'", other))),
        }
    }

    /// Map a driver error, turning "no such table/database" into `NotFound`.
    fn classify(err: sqlx::Error, name: &str, context: &str) -> DumpError {
        if let sqlx::Error::Database(ref db_err) = err {
            let not_found = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .and_then(|mysql_err| not_found_error(mysql_err.number(), name));
            return not_found.unwrap_or_else(|| DumpError::query(err, context));
        }
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => DumpError::connection(err, context),
            other => DumpError::query(other, context),
        }
    }

    /// Read a column of a text-protocol row as UTF-8 text.
    fn text_at(row: &MySqlRow, idx: usize, context: &str) -> Result<String> {
        let bytes = Self::field_bytes(row, idx, context)?
            .ok_or_else(|| DumpError::query("catalog returned NULL", context))?;
        utf8_text(bytes, context)
    }

    /// Raw bytes of one field of a text-protocol row, `None` for NULL.
    fn field_bytes<'r>(
        row: &'r MySqlRow,
        idx: usize,
        context: &str,
    ) -> Result<Option<&'r [u8]>> {
        let raw = row
            .try_get_raw(idx)
            .map_err(|e| DumpError::query(e, context))?;
        if raw.is_null() {
            return Ok(None);
        }
        row.try_get_unchecked(idx)
            .map(Some)
            .map_err(|e| DumpError::query(e, context))
    }

    /// Fetch the second field of the single row returned by a SHOW CREATE
    /// statement.
    async fn show_create(&self, sql: &str, name: &str) -> Result<Option<String>> {
        debug!("{}", sql);
        let row: Option<MySqlRow> = self
            .pool
            .fetch_optional(sql)
            .await
            .map_err(|e| Self::classify(e, name, sql))?;

        row.map(|r| {
            let fields = (0..r.len())
                .map(|i| Self::field_bytes(&r, i, sql))
                .collect::<Result<Vec<_>>>()?;
            create_statement(&fields, sql)
        })
        .transpose()
    }

    /// Decode one text-protocol cell against its declared type.
    fn decode_cell<'r>(
        row: &'r MySqlRow,
        idx: usize,
        source_type: &SourceType,
    ) -> Result<RawValue<'r>> {
        let bytes = Self::field_bytes(row, idx, "reading row value")?;
        Ok(cell_value(bytes, source_type))
    }
}

/// `NotFound` for the MySQL error numbers that mean "no such table/database".
fn not_found_error(number: u16, name: &str) -> Option<DumpError> {
    match number {
        ER_NO_SUCH_TABLE => Some(DumpError::table_not_found(name)),
        ER_BAD_DB_ERROR => Some(DumpError::database_not_found(name)),
        _ => None,
    }
}

fn utf8_text(bytes: &[u8], context: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| DumpError::query("catalog returned non UTF-8 text", context))
}

/// The DDL text of a SHOW CREATE row: its second field, unmodified.
fn create_statement(fields: &[Option<&[u8]>], context: &str) -> Result<String> {
    match fields.get(1) {
        Some(Some(ddl)) => utf8_text(ddl, context),
        Some(None) => Err(DumpError::query("SHOW CREATE returned NULL", context)),
        None => Err(DumpError::query(
            format!("SHOW CREATE returned {} field(s), expected 2", fields.len()),
            context,
        )),
    }
}

/// Turn one text-protocol cell (`None` for NULL) into a value of the
/// declared type.
fn cell_value<'r>(bytes: Option<&'r [u8]>, source_type: &SourceType) -> RawValue<'r> {
    let Some(bytes) = bytes else {
        return RawValue::null();
    };
    match source_type.family() {
        Some(TypeFamily::Binary) => RawValue::bytes(bytes),
        _ if *source_type == SourceType::Bit => RawValue::text(bit_value(bytes)),
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => RawValue::text(s),
            Err(_) => RawValue::bytes(bytes),
        },
    }
}

/// BIT(n) values arrive as big-endian bytes; render them as an unsigned
/// decimal number.
fn bit_value(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
        .to_string()
}

#[async_trait]
impl DumpSource for MysqlReader {
    async fn create_table_ddl(&self, database: &str, table: &str) -> Result<String> {
        let sql = format!("SHOW CREATE TABLE {}", qualify_mysql(database, table)?);
        let full_name = format!("{}.{}", database, table);
        self.show_create(&sql, &full_name)
            .await?
            .ok_or_else(|| DumpError::table_not_found(full_name))
    }

    async fn create_database_ddl(&self, database: &str) -> Result<String> {
        let sql = format!(
            "SHOW CREATE DATABASE IF NOT EXISTS {}",
            quote_mysql(database)?
        );
        self.show_create(&sql, database)
            .await?
            .ok_or_else(|| DumpError::database_not_found(database))
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        let sql = "SHOW DATABASES";
        let rows: Vec<MySqlRow> = self
            .pool
            .fetch_all(sql)
            .await
            .map_err(|e| Self::classify(e, "", sql))?;

        rows.iter().map(|r| Self::text_at(r, 0, sql)).collect()
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        // CAST to CHAR to handle collation differences where information_schema
        // may return VARBINARY instead of VARCHAR
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::classify(e, database, "listing MySQL tables"))?;

        let tables = rows
            .iter()
            .map(|row| {
                row.try_get::<String, _>("TABLE_NAME")
                    .map_err(|e| DumpError::query(e, "listing MySQL tables"))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Found {} tables in database '{}'", tables.len(), database);
        Ok(tables)
    }

    async fn describe_table(&self, database: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let full_name = format!("{}.{}", database, table);
        let rows: Vec<MySqlRow> = sqlx::query(DESCRIBE_COLUMNS_QUERY)
            .bind(database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::classify(e, &full_name, "loading MySQL columns"))?;

        if rows.is_empty() {
            return Err(DumpError::table_not_found(full_name));
        }

        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("COLUMN_NAME")
                    .map_err(|e| DumpError::query(e, "loading MySQL columns"))?;
                let data_type: String = row
                    .try_get("DATA_TYPE")
                    .map_err(|e| DumpError::query(e, "loading MySQL columns"))?;
                Ok(ColumnDescriptor::new(name, SourceType::from_mysql(&data_type)))
            })
            .collect()
    }

    async fn scan_table(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDescriptor],
        visit: &mut RowVisitor<'_>,
    ) -> Result<u64> {
        let full_name = format!("{}.{}", database, table);
        let sql = format!(
            "SELECT /*!40001 SQL_NO_CACHE */ * FROM {}",
            qualify_mysql(database, table)?
        );
        debug!("{}", sql);

        // A plain &str query carries no arguments, so SQLx sends it over the
        // text protocol. The stream (and its pooled connection) is dropped on
        // every return path.
        let mut rows = self.pool.fetch(sql.as_str());
        let mut count: u64 = 0;

        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| Self::classify(e, &full_name, "scanning MySQL table"))?
        {
            if row.len() != columns.len() {
                return Err(DumpError::RowShape {
                    table: table.to_string(),
                    expected: columns.len(),
                    actual: row.len(),
                });
            }

            let values: DumpRow<'_> = columns
                .iter()
                .enumerate()
                .map(|(i, col)| Self::decode_cell(&row, i, &col.source_type))
                .collect::<Result<_>>()?;

            visit(values)?;
            count += 1;
        }

        debug!("Scanned {} rows from {}", count, full_name);
        Ok(count)
    }

    async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DumpError::connection(e, "testing MySQL connection"))?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mysql"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
