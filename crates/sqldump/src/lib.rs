//! # sqldump
//!
//! Export MySQL/MariaDB schemas and rows as replayable SQL statements.
//!
//! This library provides:
//!
//! - **Catalog DDL** taken verbatim from `SHOW CREATE TABLE` / `SHOW CREATE DATABASE`
//! - **Row serialization** into `INSERT` statements with correctly escaped
//!   text, hex-encoded binary and passthrough numeric literals
//! - **Streaming** table scans: each row is encoded and emitted before the
//!   next one is fetched
//! - **Run summaries** with per-table failure accounting
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqldump::{Config, Dumper, WriterSink};
//!
//! #[tokio::main]
//! async fn main() -> sqldump::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let dumper = Dumper::new(config).await?;
//!     let mut sink = WriterSink::new(std::io::stdout());
//!     let result = dumper.run(&mut sink).await?;
//!     eprintln!("Dumped {} rows", result.rows_dumped);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod dump;
pub mod encode;
pub mod error;
pub mod orchestrator;

// Re-exports for convenient access
pub use config::{Config, DumpConfig, SourceConfig};
pub use core::{ColumnDescriptor, DumpSource, RawValue, SourceType, TypeFamily};
pub use drivers::MysqlReader;
pub use dump::{DumpDriver, DumpOptions, StatementSink, TableDump, WriterSink};
pub use encode::{encode, serialize_row, EncodedLiteral};
pub use error::{DumpError, Result};
pub use orchestrator::{DumpResult, Dumper, HealthCheckResult};
