//! Database driver implementations.
//!
//! Each driver implements [`DumpSource`](crate::core::DumpSource) for one
//! database engine:
//!
//! - [`mysql`]: MySQL and MariaDB via SQLx

pub mod mysql;

pub use mysql::MysqlReader;
