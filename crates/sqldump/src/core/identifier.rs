//! Identifier validation and quoting for generated SQL.
//!
//! Table and database names cannot be bound as query parameters, so every
//! catalog and scan query embeds them as quoted identifiers. Names are
//! validated first (no NUL bytes, bounded length), then wrapped in backticks
//! with embedded backticks doubled.

use crate::error::{DumpError, Result};

/// Maximum identifier length (MySQL allows 64 characters; leave headroom
/// for multi-byte names).
const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `DumpError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DumpError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(DumpError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DumpError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// Escapes backticks by doubling them and wraps in backticks.
/// Validates the identifier before quoting.
///
/// # Examples
///
/// ```
/// use sqldump::core::identifier::quote_mysql;
///
/// assert_eq!(quote_mysql("users").unwrap(), "`users`");
/// assert_eq!(quote_mysql("table`name").unwrap(), "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Qualify a MySQL table name with its database.
///
/// Returns `` `database`.`table` `` with proper quoting.
pub fn qualify_mysql(database: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mysql(database)?, quote_mysql(table)?))
}
