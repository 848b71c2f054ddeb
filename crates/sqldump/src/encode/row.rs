//! INSERT statement generation for one row.

use crate::core::identifier::quote_mysql;
use crate::core::schema::ColumnDescriptor;
use crate::core::value::RawValue;
use crate::error::{DumpError, Result};

use super::{encode, EncodeError};

/// Every generated row statement starts with this keyword sequence.
pub const INSERT_TEMPLATE_PREFIX: &str = "INSERT INTO ";

/// Render one row as `` INSERT INTO `table` VALUES (...); ``.
///
/// Values are encoded in column order and joined with `, `. Nothing is
/// returned unless every column encodes, so a failing column never leaves a
/// partial statement behind.
pub fn serialize_row(
    table: &str,
    columns: &[ColumnDescriptor],
    row: &[RawValue<'_>],
) -> Result<String> {
    if row.len() != columns.len() {
        return Err(DumpError::RowShape {
            table: table.to_string(),
            expected: columns.len(),
            actual: row.len(),
        });
    }

    let mut literals = Vec::with_capacity(columns.len());
    for (column, value) in columns.iter().zip(row) {
        let literal = encode(value, &column.source_type)
            .map_err(|e| column_error(table, column, e))?;
        literals.push(literal.to_string());
    }

    Ok(format!(
        "{}{} VALUES ({});",
        INSERT_TEMPLATE_PREFIX,
        quote_mysql(table)?,
        literals.join(", ")
    ))
}

fn column_error(table: &str, column: &ColumnDescriptor, err: EncodeError) -> DumpError {
    match err {
        EncodeError::UnsupportedType(type_name) => DumpError::UnsupportedType {
            table: table.to_string(),
            column: column.name.clone(),
            type_name,
        },
        other => DumpError::InvalidValue {
            table: table.to_string(),
            column: column.name.clone(),
            message: other.to_string(),
        },
    }
}
