//! Rendering of cell values as MySQL literals.
//!
//! The encoding is chosen by the column's [`TypeFamily`]:
//!
//! | Family   | NULL   | non-NULL                                  |
//! |----------|--------|-------------------------------------------|
//! | Binary   | `NULL` | `0x` + uppercase hex, unquoted            |
//! | Text     | `NULL` | escaped and wrapped in single quotes      |
//! | Temporal | `NULL` | wrapped in single quotes, no escaping     |
//! | Numeric  | `NULL` | passed through, unquoted                  |
//!
//! Types outside these families are rejected, even for NULL cells.

mod row;

pub use row::{serialize_row, INSERT_TEMPLATE_PREFIX};

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::core::schema::{SourceType, TypeFamily};
use crate::core::value::{Payload, RawValue};

/// Bare NULL keyword.
pub const NULL_LITERAL: &str = "NULL";

/// Prefix of hexadecimal byte literals.
pub const HEX_PREFIX: &str = "0x";

/// Why a value could not be encoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unsupported SQL type: {0}")]
    UnsupportedType(String),

    #[error("{0} value is not valid UTF-8")]
    InvalidText(String),

    #[error("non-NULL {0} value has no payload")]
    MissingPayload(String),
}

/// An SQL literal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedLiteral {
    /// The bare `NULL` keyword.
    Null,

    /// Single-quoted string; holds the (already escaped) contents.
    Quoted(String),

    /// Unquoted hex literal; holds the uppercase digits without `0x`.
    Hex(String),

    /// Unquoted passthrough.
    Plain(String),
}

impl fmt::Display for EncodedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedLiteral::Null => f.write_str(NULL_LITERAL),
            EncodedLiteral::Quoted(s) => write!(f, "'{}'", s),
            EncodedLiteral::Hex(digits) => write!(f, "{}{}", HEX_PREFIX, digits),
            EncodedLiteral::Plain(s) => f.write_str(s),
        }
    }
}

/// Encode one cell of the given declared type.
pub fn encode(
    value: &RawValue<'_>,
    source_type: &SourceType,
) -> std::result::Result<EncodedLiteral, EncodeError> {
    let family = source_type
        .family()
        .ok_or_else(|| EncodeError::UnsupportedType(source_type.to_string()))?;

    if value.is_null {
        return Ok(EncodedLiteral::Null);
    }

    match family {
        TypeFamily::Binary => {
            let bytes = value
                .payload
                .as_bytes()
                .ok_or_else(|| EncodeError::MissingPayload(source_type.to_string()))?;
            Ok(EncodedLiteral::Hex(hex_upper(bytes)))
        }
        TypeFamily::Text => {
            let text = payload_text(&value.payload, source_type)?;
            Ok(EncodedLiteral::Quoted(escape_string(&text)))
        }
        TypeFamily::Temporal => {
            let text = payload_text(&value.payload, source_type)?;
            Ok(EncodedLiteral::Quoted(text.into_owned()))
        }
        TypeFamily::Numeric => {
            let text = payload_text(&value.payload, source_type)?;
            Ok(EncodedLiteral::Plain(text.into_owned()))
        }
    }
}

fn payload_text<'p>(
    payload: &'p Payload<'_>,
    source_type: &SourceType,
) -> std::result::Result<Cow<'p, str>, EncodeError> {
    match payload {
        Payload::Text(s) => Ok(Cow::Borrowed(s.as_ref())),
        Payload::Bytes(b) => std::str::from_utf8(b)
            .map(Cow::Borrowed)
            .map_err(|_| EncodeError::InvalidText(source_type.to_string())),
        Payload::Empty => Err(EncodeError::MissingPayload(source_type.to_string())),
    }
}

/// Uppercase hex digits of `bytes`, two per byte, no separators.
pub fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Escape a string for use inside a single-quoted MySQL literal.
///
/// Backslash is escaped first, so substitutions never re-escape each other.
/// The raw control bytes 0x1A and 0x00 become `\Z` and `\0`.
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\u{8}' => result.push_str("\\b"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{1A}' => result.push_str("\\Z"),
            '\0' => result.push_str("\\0"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMERIC_TYPES: [SourceType; 9] = [
        SourceType::Numeric,
        SourceType::Bigint,
        SourceType::Integer,
        SourceType::Smallint,
        SourceType::Tinyint,
        SourceType::Decimal,
        SourceType::Bit,
        SourceType::Real,
        SourceType::Double,
    ];

    const BINARY_TYPES: [SourceType; 5] = [
        SourceType::Varbinary,
        SourceType::Binary,
        SourceType::Blob,
        SourceType::Clob,
        SourceType::Nclob,
    ];

    fn all_supported() -> Vec<SourceType> {
        let mut types = vec![
            SourceType::Varchar,
            SourceType::Char,
            SourceType::Time,
            SourceType::Timestamp,
            SourceType::Date,
        ];
        types.extend(NUMERIC_TYPES);
        types.extend(BINARY_TYPES);
        types
    }

    fn enc(value: RawValue<'_>, t: SourceType) -> String {
        encode(&value, &t).unwrap().to_string()
    }

    /// Reverse of `escape_string`, for round-trip checks.
    fn unescape(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('b') => out.push('\u{8}'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('Z') => out.push('\u{1A}'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => panic!("dangling backslash in {:?}", s),
            }
        }
        out
    }

    #[test]
    fn test_numeric_passthrough() {
        for input in ["0", "1", "-5", "9223372036854775807", "12.50", "-0.001", "1e10"] {
            for t in NUMERIC_TYPES {
                assert_eq!(enc(RawValue::text(input), t.clone()), input, "{}", t);
            }
        }
    }

    #[test]
    fn test_varchar_quote_escaped() {
        assert_eq!(enc(RawValue::text("O'Brien"), SourceType::Varchar), "'O\\'Brien'");
        assert_eq!(enc(RawValue::text(""), SourceType::Varchar), "''");
        assert_eq!(
            enc(RawValue::text("say \"hi\""), SourceType::Char),
            "'say \\\"hi\\\"'"
        );
    }

    #[test]
    fn test_varbinary_hex() {
        let bytes = vec![0x00u8, 0xFF, 0x1A];
        assert_eq!(enc(RawValue::bytes(bytes), SourceType::Varbinary), "0x00FF1A");
    }

    #[test]
    fn test_empty_bytes_yield_bare_prefix() {
        assert_eq!(enc(RawValue::bytes(Vec::new()), SourceType::Blob), "0x");
    }

    #[test]
    fn test_binary_is_never_quoted_or_escaped() {
        let bytes = b"it's a \\ \"blob\"\n".to_vec();
        let literal = enc(RawValue::bytes(bytes.clone()), SourceType::Blob);
        assert!(literal.starts_with("0x"));
        assert!(!literal.contains('\''));
        assert_eq!(literal, format!("0x{}", hex::encode_upper(&bytes)));
    }

    #[test]
    fn test_hex_round_trip() {
        let samples: Vec<Vec<u8>> = vec![
            vec![],
            vec![0x00],
            vec![0x0F, 0xF0],
            (0u8..=255).collect(),
            b"plain ascii".to_vec(),
            vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01],
        ];
        for bytes in samples {
            for t in BINARY_TYPES {
                let literal = enc(RawValue::bytes(bytes.clone()), t);
                let digits = literal.strip_prefix("0x").unwrap();
                assert_eq!(digits.len(), bytes.len() * 2);
                assert!(digits.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
                let decoded = hex::decode(digits).unwrap();
                assert_eq!(decoded, bytes);
                assert_eq!(hex_upper(&decoded), digits);
            }
        }
    }

    #[test]
    fn test_text_payload_in_binary_column_uses_utf8_bytes() {
        assert_eq!(enc(RawValue::text("AB"), SourceType::Clob), "0x4142");
    }

    #[test]
    fn test_temporal_quoted_without_escaping() {
        assert_eq!(
            enc(RawValue::text("2024-01-31 23:59:59"), SourceType::Timestamp),
            "'2024-01-31 23:59:59'"
        );
        assert_eq!(enc(RawValue::text("12:30:00"), SourceType::Time), "'12:30:00'");
        assert_eq!(enc(RawValue::text("2024-02-29"), SourceType::Date), "'2024-02-29'");
        // Temporal values are not run through the escaper.
        assert_eq!(enc(RawValue::text("a\\b"), SourceType::Time), "'a\\b'");
    }

    #[test]
    fn test_null_propagation_ignores_payload() {
        for t in all_supported() {
            let with_text = RawValue {
                is_null: true,
                payload: Payload::Text("garbage'".into()),
            };
            let with_bytes = RawValue {
                is_null: true,
                payload: Payload::Bytes(vec![1u8, 2, 3].into()),
            };
            assert_eq!(enc(RawValue::null(), t.clone()), "NULL", "{}", t);
            assert_eq!(enc(with_text, t.clone()), "NULL", "{}", t);
            assert_eq!(enc(with_bytes, t.clone()), "NULL", "{}", t);
        }
    }

    #[test]
    fn test_unsupported_type_fails_even_for_null() {
        let t = SourceType::Unsupported("JSON".into());
        assert_eq!(
            encode(&RawValue::text("{}"), &t),
            Err(EncodeError::UnsupportedType("JSON".into()))
        );
        assert_eq!(
            encode(&RawValue::null(), &t),
            Err(EncodeError::UnsupportedType("JSON".into()))
        );
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let err = encode(&RawValue::bytes(vec![0xC3u8, 0x28]), &SourceType::Varchar).unwrap_err();
        assert_eq!(err, EncodeError::InvalidText("VARCHAR".into()));
    }

    #[test]
    fn test_utf8_bytes_in_text_column_are_decoded() {
        let bytes = "déjà vu".as_bytes().to_vec();
        assert_eq!(enc(RawValue::bytes(bytes), SourceType::Varchar), "'déjà vu'");
    }

    #[test]
    fn test_missing_payload_is_rejected() {
        let v = RawValue {
            is_null: false,
            payload: Payload::Empty,
        };
        assert!(matches!(
            encode(&v, &SourceType::Integer),
            Err(EncodeError::MissingPayload(_))
        ));
        assert!(matches!(
            encode(&v, &SourceType::Blob),
            Err(EncodeError::MissingPayload(_))
        ));
    }

    #[test]
    fn test_escape_each_special_character() {
        assert_eq!(escape_string("\\"), "\\\\");
        assert_eq!(escape_string("\u{8}"), "\\b");
        assert_eq!(escape_string("\n"), "\\n");
        assert_eq!(escape_string("\r"), "\\r");
        assert_eq!(escape_string("\t"), "\\t");
        assert_eq!(escape_string("\u{1A}"), "\\Z");
        assert_eq!(escape_string("\0"), "\\0");
        assert_eq!(escape_string("'"), "\\'");
        assert_eq!(escape_string("\""), "\\\"");
        assert_eq!(escape_string("plain"), "plain");
    }

    #[test]
    fn test_escape_backslash_not_double_escaped() {
        // An existing "\n" text sequence must survive as backslash + n.
        assert_eq!(escape_string("a\\nb"), "a\\\\nb");
        assert_eq!(escape_string("\\'"), "\\\\\\'");
        // The four-character text "\x00" is ordinary text, not a control byte.
        assert_eq!(escape_string("\\x00"), "\\\\x00");
    }

    #[test]
    fn test_escape_round_trip() {
        let samples = [
            "O'Brien",
            "line1\nline2\r\n",
            "tab\there",
            "back\\slash",
            "quote\"d",
            "\u{8}\u{1A}\0",
            "mixed \\n literal and \n real",
            "trailing backslash \\",
            "unicode ✓ 日本語",
            "",
        ];
        for s in samples {
            let escaped = escape_string(s);
            assert!(!escaped.contains('\n'));
            assert!(!escaped.contains('\0'));
            assert_eq!(unescape(&escaped), s, "round trip of {:?}", s);
        }
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(EncodedLiteral::Null.to_string(), "NULL");
        assert_eq!(EncodedLiteral::Quoted("a".into()).to_string(), "'a'");
        assert_eq!(EncodedLiteral::Hex("0A".into()).to_string(), "0x0A");
        assert_eq!(EncodedLiteral::Plain("42".into()).to_string(), "42");
    }
}
