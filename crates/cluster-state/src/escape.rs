//! Escaping of free-text values so they survive whitespace tokenization.

use crate::error::{Error, Result};

/// Escapes `value` so that it contains no whitespace and only printable ASCII
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x0c => out.push_str("\\f"),
            b'!'..=b'~' => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out
}

/// Reverses [`escape`]
///
/// # Errors
///
/// Returns [`Error::InvalidEscape`] for an unknown escape, a `\x` not followed
/// by two hex digits, a trailing backslash, or bytes that do not form UTF-8.
pub fn unescape(value: &str) -> Result<String> {
    let invalid = |reason: &str| Error::InvalidEscape {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut bytes = Vec::with_capacity(value.len());
    let mut input = value.bytes();
    while let Some(byte) = input.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match input.next() {
            Some(b'\\') => bytes.push(b'\\'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'f') => bytes.push(0x0c),
            Some(b'x') => {
                let high = input.next().and_then(hex_value);
                let low = input.next().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => bytes.push((high << 4) | low),
                    _ => return Err(invalid("\\x needs two hex digits")),
                }
            }
            Some(other) => {
                return Err(invalid(&format!(
                    "unknown escape '\\{}'",
                    char::from(other)
                )));
            }
            None => return Err(invalid("trailing backslash")),
        }
    }

    String::from_utf8(bytes).map_err(|_| invalid("not valid UTF-8"))
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte)
        .to_digit(16)
        .and_then(|digit| u8::try_from(digit).ok())
}
