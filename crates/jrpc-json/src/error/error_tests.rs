#![allow(non_snake_case)]

use super::*;

#[test]
fn JsonError___parse___display_includes_offset_and_reason() {
    let err = JsonError::Parse {
        offset: 7,
        reason: ParseFailure::ExpectedColon,
    };

    let display = err.to_string();

    assert!(display.contains("offset 7"));
    assert!(display.contains("':'"));
}

#[test]
fn JsonError___parse_offset___returns_offset_for_parse_errors() {
    let err = JsonError::Parse {
        offset: 3,
        reason: ParseFailure::InvalidLiteral,
    };

    assert_eq!(err.parse_offset(), Some(3));
    assert_eq!(JsonError::NotFound.parse_offset(), None);
}

#[test]
fn JsonError___is_unexpected_end___only_for_truncated_input() {
    let truncated = JsonError::Parse {
        offset: 10,
        reason: ParseFailure::UnexpectedEnd,
    };
    let invalid = JsonError::Parse {
        offset: 2,
        reason: ParseFailure::UnexpectedByte(b']'),
    };

    assert!(truncated.is_unexpected_end());
    assert!(!invalid.is_unexpected_end());
}

#[test]
fn JsonError___kind_mismatch___names_both_kinds() {
    let err = JsonError::KindMismatch {
        expected: Kind::Array,
        actual: Kind::Object,
    };

    let display = err.to_string();

    assert!(display.contains("array"));
    assert!(display.contains("object"));
}

#[test]
fn JsonError___from_io_error___wraps_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");

    let err: JsonError = io.into();

    assert!(matches!(err, JsonError::Io(_)));
}

#[test]
fn ParseFailure___unexpected_byte___shows_hex() {
    let display = ParseFailure::UnexpectedByte(0x7d).to_string();

    assert!(display.contains("0x7d"));
}
