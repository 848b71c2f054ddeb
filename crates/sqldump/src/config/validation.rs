//! Configuration validation.

use super::Config;
use crate::error::{DumpError, Result};

const SSL_MODES: &[&str] = &[
    "disabled",
    "preferred",
    "required",
    "verify_ca",
    "verify_identity",
];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(DumpError::Config("source.host is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(DumpError::Config("source.user is required".into()));
    }
    if config.source.r#type != "mysql" {
        return Err(DumpError::Config(format!(
            "source.type must be 'mysql', got '{}'",
            config.source.r#type
        )));
    }
    if !SSL_MODES.contains(&config.source.ssl_mode.to_lowercase().as_str()) {
        return Err(DumpError::Config(format!(
            "source.ssl_mode must be one of {}, got '{}'",
            SSL_MODES.join(", "),
            config.source.ssl_mode
        )));
    }

    // Something must be selected for dumping
    if !config.dump.all_databases
        && config.dump.databases.is_empty()
        && config.source.database.is_empty()
    {
        return Err(DumpError::Config(
            "nothing to dump: set source.database, dump.databases or dump.all_databases".into(),
        ));
    }
    if config.dump.databases.iter().any(|d| d.is_empty()) {
        return Err(DumpError::Config(
            "dump.databases must not contain empty names".into(),
        ));
    }
    for pattern in config
        .dump
        .include_tables
        .iter()
        .chain(&config.dump.exclude_tables)
    {
        if pattern.is_empty() {
            return Err(DumpError::Config(
                "table patterns must not be empty".into(),
            ));
        }
        glob::Pattern::new(pattern).map_err(|e| {
            DumpError::Config(format!("invalid table pattern '{}': {}", pattern, e))
        })?;
    }

    if config.dump.max_connections == 0 {
        return Err(DumpError::Config(
            "dump.max_connections must be at least 1".into(),
        ));
    }

    Ok(())
}
