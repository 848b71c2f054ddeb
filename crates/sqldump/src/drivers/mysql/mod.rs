//! MySQL/MariaDB database driver.
//!
//! - [`MysqlReader`]: catalog queries and text-protocol table scans
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod reader;

pub use reader::MysqlReader;
