//! Driver-native cell values.
//!
//! A [`RawValue`] keeps the NULL flag and the payload as two explicit fields,
//! so the NULL decision never depends on the order in which the payload was
//! read from the driver.

use std::borrow::Cow;

/// Payload of a non-NULL cell.
///
/// Uses `Cow` so values can borrow straight from the driver's row buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload<'a> {
    /// No payload (only meaningful together with `is_null`).
    #[default]
    Empty,

    /// Textual rendering of the value, as reported by the driver.
    Text(Cow<'a, str>),

    /// Raw bytes (binary columns, or text the driver could not decode).
    Bytes(Cow<'a, [u8]>),
}

impl<'a> Payload<'a> {
    /// The payload as bytes. Text payloads yield their UTF-8 encoding.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Empty => None,
            Payload::Text(s) => Some(s.as_bytes()),
            Payload::Bytes(b) => Some(b),
        }
    }

    /// Convert to a fully owned payload.
    #[must_use]
    pub fn into_owned(self) -> Payload<'static> {
        match self {
            Payload::Empty => Payload::Empty,
            Payload::Text(s) => Payload::Text(Cow::Owned(s.into_owned())),
            Payload::Bytes(b) => Payload::Bytes(Cow::Owned(b.into_owned())),
        }
    }
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawValue<'a> {
    /// The driver reported SQL NULL. Any payload is ignored.
    pub is_null: bool,

    /// The value itself.
    pub payload: Payload<'a>,
}

impl<'a> RawValue<'a> {
    /// A NULL cell.
    #[must_use]
    pub fn null() -> Self {
        Self {
            is_null: true,
            payload: Payload::Empty,
        }
    }

    /// A non-NULL cell with a text payload.
    #[must_use]
    pub fn text(s: impl Into<Cow<'a, str>>) -> Self {
        Self {
            is_null: false,
            payload: Payload::Text(s.into()),
        }
    }

    /// A non-NULL cell with a byte payload.
    #[must_use]
    pub fn bytes(b: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            is_null: false,
            payload: Payload::Bytes(b.into()),
        }
    }

    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> RawValue<'static> {
        RawValue {
            is_null: self.is_null,
            payload: self.payload.into_owned(),
        }
    }
}

impl From<i64> for RawValue<'static> {
    fn from(v: i64) -> Self {
        RawValue::text(v.to_string())
    }
}

impl From<i32> for RawValue<'static> {
    fn from(v: i32) -> Self {
        RawValue::text(v.to_string())
    }
}

impl From<String> for RawValue<'static> {
    fn from(v: String) -> Self {
        RawValue::text(v)
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(v: &'a str) -> Self {
        RawValue::text(v)
    }
}

impl From<Vec<u8>> for RawValue<'static> {
    fn from(v: Vec<u8>) -> Self {
        RawValue::bytes(v)
    }
}

impl<'a> From<&'a [u8]> for RawValue<'a> {
    fn from(v: &'a [u8]) -> Self {
        RawValue::bytes(v)
    }
}

impl<'a, T> From<Option<T>> for RawValue<'a>
where
    T: Into<RawValue<'a>>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_else(RawValue::null)
    }
}

/// One row, aligned 1:1 with the table's column descriptors.
pub type Row<'a> = Vec<RawValue<'a>>;
