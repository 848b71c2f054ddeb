//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MySQL/MariaDB).
    pub source: SourceConfig,

    /// Dump behavior configuration.
    #[serde(default)]
    pub dump: DumpConfig,
}

/// Source database (MySQL/MariaDB) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database type (always "mysql" for now).
    #[serde(default = "default_mysql")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Default database. Dumped when `dump.databases` is empty and
    /// `dump.all_databases` is off.
    #[serde(default)]
    pub database: String,

    /// Username.
    pub user: String,

    /// Password. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// SSL mode: disabled, preferred, required, verify_ca, verify_identity
    /// (default: "preferred").
    #[serde(default = "default_preferred")]
    pub ssl_mode: String,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Dump behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Databases to dump. Falls back to `source.database` when empty.
    #[serde(default)]
    pub databases: Vec<String>,

    /// Dump every visible database except the system schemas.
    #[serde(default)]
    pub all_databases: bool,

    /// Tables to include (glob patterns, `*` and `?`). Empty means all.
    #[serde(default)]
    pub include_tables: Vec<String>,

    /// Tables to exclude (glob patterns, `*` and `?`).
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// Emit CREATE TABLE statements before the rows (default: true).
    #[serde(default = "default_true")]
    pub include_ddl: bool,

    /// Emit CREATE DATABASE and USE statements per database (default: false).
    #[serde(default)]
    pub create_database: bool,

    /// Keep going after a table fails with a non-fatal error (default: false).
    #[serde(default)]
    pub continue_on_error: bool,

    /// Output file. Statements go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Maximum pooled connections (default: 2).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            databases: Vec::new(),
            all_databases: false,
            include_tables: Vec::new(),
            exclude_tables: Vec::new(),
            include_ddl: true,
            create_database: false,
            continue_on_error: false,
            output: None,
            max_connections: default_max_connections(),
        }
    }
}

impl DumpConfig {
    /// Check a table name against the include patterns only.
    pub fn includes_table(&self, table: &str) -> bool {
        self.include_tables.is_empty()
            || self
                .include_tables
                .iter()
                .any(|p| matches_pattern(p, table))
    }

    /// Check a table name against the include/exclude patterns.
    pub fn selects_table(&self, table: &str) -> bool {
        self.includes_table(table)
            && !self
                .exclude_tables
                .iter()
                .any(|p| matches_pattern(p, table))
    }
}

/// Case-insensitive glob match (`*`, `?`, `[...]`).
///
/// Malformed patterns never match; config validation rejects them first.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches_with(name, PATTERN_OPTIONS))
        .unwrap_or(false)
}

/// Whether a pattern contains no glob metacharacters.
pub fn is_literal_pattern(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

const PATTERN_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

// Default value functions for serde
fn default_mysql() -> String {
    "mysql".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_preferred() -> String {
    "preferred".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    2
}
