//! Core abstractions for the dump engine.
//!
//! - [`schema`]: column descriptors and the source type taxonomy
//! - [`value`]: driver-native cell values with an explicit NULL flag
//! - [`traits`]: the [`DumpSource`] seam implemented by database drivers
//! - [`identifier`]: identifier validation and backtick quoting
//!
//! Drivers (`drivers/mysql`) implement [`DumpSource`]; the encoder, the
//! dump driver and the orchestrator only depend on the types defined here.

pub mod identifier;
#[cfg(test)]
pub(crate) mod memory;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{ColumnDescriptor, SourceType, TypeFamily};
pub use traits::{DumpSource, RowVisitor};
pub use value::{Payload, RawValue, Row};
