//! Error types for the dump library.

use thiserror::Error;

/// Exit code for configuration errors (invalid YAML, missing fields, bad flags).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for connection failures.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for a missing table or database.
pub const EXIT_NOT_FOUND: u8 = 3;
/// Exit code for values that cannot be rendered as SQL literals.
pub const EXIT_DATA_ERROR: u8 = 4;
/// Exit code for IO errors (config file, output file).
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code for everything else.
pub const EXIT_GENERAL_ERROR: u8 = 8;

/// Main error type for dump operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not connect to (or lost) the source database
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// A catalog or data query failed
    #[error("Query failed: {message}\n  Context: {context}")]
    Query { message: String, context: String },

    /// Table or database does not exist
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Column type outside the text, binary, temporal and numeric families
    #[error("Unsupported SQL type {type_name} in column {column} of table {table}")]
    UnsupportedType {
        table: String,
        column: String,
        type_name: String,
    },

    /// A value of a supported type could not be rendered as a literal
    #[error("Invalid value in column {column} of table {table}: {message}")]
    InvalidValue {
        table: String,
        column: String,
        message: String,
    },

    /// A row does not line up with the table's column list
    #[error("Row of table {table} has {actual} values, expected {expected}")]
    RowShape {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// IO error (config file, output sink)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DumpError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        DumpError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Query error with context about where it occurred
    pub fn query(message: impl ToString, context: impl Into<String>) -> Self {
        DumpError::Query {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a NotFound error for a table
    pub fn table_not_found(name: impl Into<String>) -> Self {
        DumpError::NotFound {
            kind: "Table",
            name: name.into(),
        }
    }

    /// Create a NotFound error for a database
    pub fn database_not_found(name: impl Into<String>) -> Self {
        DumpError::NotFound {
            kind: "Database",
            name: name.into(),
        }
    }

    /// Whether this error should abort the whole run rather than one table.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DumpError::Connection { .. } | DumpError::Config(_) | DumpError::Io(_)
        )
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            DumpError::Config(_) | DumpError::Yaml(_) => EXIT_CONFIG_ERROR,
            DumpError::Connection { .. } => EXIT_CONNECTION_ERROR,
            DumpError::NotFound { .. } => EXIT_NOT_FOUND,
            DumpError::UnsupportedType { .. }
            | DumpError::InvalidValue { .. }
            | DumpError::RowShape { .. } => EXIT_DATA_ERROR,
            DumpError::Io(_) => EXIT_IO_ERROR,
            DumpError::Query { .. } | DumpError::Json(_) => EXIT_GENERAL_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;
