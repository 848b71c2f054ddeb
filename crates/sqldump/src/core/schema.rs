//! Column metadata and the source type taxonomy.
//!
//! Every column reported by the catalog is classified into a [`SourceType`],
//! and every supported source type belongs to exactly one [`TypeFamily`].
//! The family decides how a value is rendered as an SQL literal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Encoding family of a source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFamily {
    /// Uninterpreted bytes, rendered as an unquoted `0x` hex literal.
    Binary,
    /// Character data, escaped and single-quoted.
    Text,
    /// Dates and times, single-quoted without escaping.
    Temporal,
    /// Numbers and bit values, passed through unquoted.
    Numeric,
}

/// Declared type of a result-set column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Varchar,
    Char,
    Varbinary,
    Binary,
    Blob,
    Clob,
    Nclob,
    Time,
    Timestamp,
    Date,
    Numeric,
    Bigint,
    Integer,
    Smallint,
    Tinyint,
    Decimal,
    Bit,
    Real,
    Double,
    /// Anything else, with the name the catalog reported.
    Unsupported(String),
}

impl SourceType {
    /// The encoding family, or `None` for unsupported types.
    pub fn family(&self) -> Option<TypeFamily> {
        match self {
            SourceType::Varbinary
            | SourceType::Binary
            | SourceType::Blob
            | SourceType::Clob
            | SourceType::Nclob => Some(TypeFamily::Binary),
            SourceType::Varchar | SourceType::Char => Some(TypeFamily::Text),
            SourceType::Time | SourceType::Timestamp | SourceType::Date => {
                Some(TypeFamily::Temporal)
            }
            SourceType::Numeric
            | SourceType::Bigint
            | SourceType::Integer
            | SourceType::Smallint
            | SourceType::Tinyint
            | SourceType::Decimal
            | SourceType::Bit
            | SourceType::Real
            | SourceType::Double => Some(TypeFamily::Numeric),
            SourceType::Unsupported(_) => None,
        }
    }

    /// Check if values of this type can be dumped.
    pub fn is_supported(&self) -> bool {
        self.family().is_some()
    }

    /// Upper-case SQL name of the type.
    pub fn name(&self) -> &str {
        match self {
            SourceType::Varchar => "VARCHAR",
            SourceType::Char => "CHAR",
            SourceType::Varbinary => "VARBINARY",
            SourceType::Binary => "BINARY",
            SourceType::Blob => "BLOB",
            SourceType::Clob => "CLOB",
            SourceType::Nclob => "NCLOB",
            SourceType::Time => "TIME",
            SourceType::Timestamp => "TIMESTAMP",
            SourceType::Date => "DATE",
            SourceType::Numeric => "NUMERIC",
            SourceType::Bigint => "BIGINT",
            SourceType::Integer => "INTEGER",
            SourceType::Smallint => "SMALLINT",
            SourceType::Tinyint => "TINYINT",
            SourceType::Decimal => "DECIMAL",
            SourceType::Bit => "BIT",
            SourceType::Real => "REAL",
            SourceType::Double => "DOUBLE",
            SourceType::Unsupported(name) => name,
        }
    }

    /// Classify a MySQL `INFORMATION_SCHEMA.COLUMNS.DATA_TYPE` value.
    ///
    /// The MySQL text types (`TEXT`, `ENUM`, `SET`, ...) land in the text
    /// family, the `BLOB` types in the binary family. `JSON` and the spatial
    /// types are unsupported.
    pub fn from_mysql(data_type: &str) -> Self {
        match data_type.to_lowercase().as_str() {
            "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set" => {
                SourceType::Varchar
            }
            "char" => SourceType::Char,
            "varbinary" => SourceType::Varbinary,
            "binary" => SourceType::Binary,
            "tinyblob" | "blob" | "mediumblob" | "longblob" => SourceType::Blob,
            "time" => SourceType::Time,
            "datetime" | "timestamp" => SourceType::Timestamp,
            "date" => SourceType::Date,
            "numeric" => SourceType::Numeric,
            "decimal" => SourceType::Decimal,
            "bigint" => SourceType::Bigint,
            "int" | "integer" | "mediumint" => SourceType::Integer,
            "smallint" | "year" => SourceType::Smallint,
            "tinyint" => SourceType::Tinyint,
            "bit" | "bool" | "boolean" => SourceType::Bit,
            "float" => SourceType::Real,
            "double" | "real" | "double precision" => SourceType::Double,
            _ => SourceType::Unsupported(data_type.to_uppercase()),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One column of a table, in catalog ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,

    /// Declared source type.
    pub source_type: SourceType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
        }
    }
}
