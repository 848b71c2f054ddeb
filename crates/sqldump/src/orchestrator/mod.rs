//! Dump orchestrator - main workflow coordinator.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{is_literal_pattern, Config};
use crate::core::traits::DumpSource;
use crate::drivers::MysqlReader;
use crate::dump::{DumpDriver, DumpOptions, StatementSink};
use crate::error::{DumpError, Result};

/// Schemas that belong to the server itself and are never dumped by
/// `all_databases`.
pub const SYSTEM_DATABASES: &[&str] = &[
    "information_schema",
    "performance_schema",
    "mysql",
    "sys",
];

/// Dump orchestrator.
pub struct Dumper {
    config: Config,
    source: Arc<dyn DumpSource>,
}

/// Result of a dump run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status ("completed" or "failed").
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the dump started.
    pub started_at: DateTime<Utc>,

    /// When the dump completed.
    pub completed_at: DateTime<Utc>,

    /// Databases visited, in order.
    pub databases: Vec<String>,

    /// Total tables attempted.
    pub tables_total: usize,

    /// Tables dumped completely.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// Total INSERT statements emitted.
    pub rows_dumped: u64,

    /// Failed tables as `database.table`.
    pub failed_tables: Vec<String>,
}

impl DumpResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a source connection check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Source database type.
    pub db_type: String,

    /// Whether a trivial query succeeded.
    pub connected: bool,

    /// Round-trip time of the check in milliseconds.
    pub latency_ms: u64,

    /// Error message when the check failed.
    pub error: Option<String>,
}

/// Per-run counters.
#[derive(Default)]
struct RunTally {
    tables_total: usize,
    tables_success: usize,
    rows_dumped: u64,
    failed_tables: Vec<String>,
}

impl Dumper {
    /// Create a new dumper connected to the configured MySQL source.
    pub async fn new(config: Config) -> Result<Self> {
        let reader = MysqlReader::new(&config.source, config.dump.max_connections).await?;
        Ok(Self::with_source(config, Arc::new(reader)))
    }

    /// Create a dumper over an existing source.
    pub fn with_source(config: Config, source: Arc<dyn DumpSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn options(&self) -> DumpOptions {
        DumpOptions {
            include_ddl: self.config.dump.include_ddl,
            create_database: self.config.dump.create_database,
        }
    }

    /// Run the dump, writing every statement to `sink`.
    ///
    /// Connection and IO errors abort the run. Other per-table errors abort
    /// it too unless `dump.continue_on_error` is set, in which case the table
    /// is recorded as failed and the run moves on.
    pub async fn run<K: StatementSink + ?Sized>(&self, sink: &mut K) -> Result<DumpResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Starting dump run: {}", run_id);

        let databases = self.resolve_databases().await?;
        info!("Dumping {} database(s): {}", databases.len(), databases.join(", "));

        let driver = DumpDriver::new(self.source.as_ref(), self.options());
        let mut tally = RunTally::default();
        let mut matched: HashSet<String> = HashSet::new();

        for database in &databases {
            let all_tables = self.source.list_tables(database).await?;
            // Excluded tables still exist, so they count as matched.
            matched.extend(
                all_tables
                    .iter()
                    .filter(|t| self.config.dump.includes_table(t))
                    .map(|t| t.to_lowercase()),
            );
            let tables: Vec<String> = all_tables
                .into_iter()
                .filter(|t| self.config.dump.selects_table(t))
                .collect();
            debug!("{}: {} table(s) selected", database, tables.len());

            driver.begin_database(database, sink).await?;

            for table in &tables {
                tally.tables_total += 1;
                match driver.dump_table(database, table, sink).await {
                    Ok(dump) => {
                        tally.tables_success += 1;
                        tally.rows_dumped += dump.rows;
                    }
                    Err(e) => {
                        self.record_failure(&mut tally, format!("{}.{}", database, table), e)?
                    }
                }
            }
        }

        // Literal table names that matched nothing anywhere were asked for
        // explicitly and do not exist.
        for name in self.missing_literal_tables(&matched) {
            tally.tables_total += 1;
            let err = DumpError::table_not_found(name.clone());
            self.record_failure(&mut tally, name, err)?;
        }

        sink.flush()?;

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let tables_failed = tally.failed_tables.len();

        let result = DumpResult {
            run_id,
            status: if tables_failed > 0 { "failed" } else { "completed" }.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            databases,
            tables_total: tally.tables_total,
            tables_success: tally.tables_success,
            tables_failed,
            rows_dumped: tally.rows_dumped,
            failed_tables: tally.failed_tables,
        };

        info!(
            "Dump {}: {} tables, {} rows in {:.1}s",
            result.status, result.tables_total, result.rows_dumped, result.duration_seconds
        );

        Ok(result)
    }

    fn record_failure(&self, tally: &mut RunTally, table: String, err: DumpError) -> Result<()> {
        if err.is_fatal() || !self.config.dump.continue_on_error {
            error!("Table {} failed: {}", table, err);
            return Err(err);
        }
        warn!("Table {} failed, continuing: {}", table, err);
        tally.failed_tables.push(table);
        Ok(())
    }

    fn missing_literal_tables(&self, matched: &HashSet<String>) -> Vec<String> {
        self.config
            .dump
            .include_tables
            .iter()
            .filter(|p| is_literal_pattern(p))
            .filter(|p| !matched.contains(&p.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Databases to dump: the explicit list (each checked against the
    /// catalog) or every non-system database.
    async fn resolve_databases(&self) -> Result<Vec<String>> {
        let available = self.source.list_databases().await?;

        if self.config.dump.all_databases {
            return Ok(available
                .into_iter()
                .filter(|d| !SYSTEM_DATABASES.contains(&d.to_lowercase().as_str()))
                .collect());
        }

        let requested = self.config.explicit_databases();
        for database in &requested {
            if !available.iter().any(|d| d == database) {
                return Err(DumpError::database_not_found(database.clone()));
            }
        }
        Ok(requested)
    }

    /// List databases visible to the configured user.
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.source.list_databases().await
    }

    /// CREATE TABLE statement for one table, terminated with `;`.
    pub async fn table_ddl(&self, database: &str, table: &str) -> Result<String> {
        let ddl = self.source.create_table_ddl(database, table).await?;
        Ok(format!("{};", ddl))
    }

    /// Test the source connection and measure its latency.
    pub async fn health_check(&self) -> Result<HealthCheckResult> {
        let start = Instant::now();
        let outcome = self.source.test_connection().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        Ok(HealthCheckResult {
            db_type: self.source.db_type().to_string(),
            connected: outcome.is_ok(),
            latency_ms,
            error: outcome.err().map(|e| e.to_string()),
        })
    }

    /// Close the source connection pool.
    pub async fn close(&self) {
        self.source.close().await;
    }
}
