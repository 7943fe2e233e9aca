//! MySQL literal escaping helpers.

use chrono::{DateTime, FixedOffset};

/// Escapes the inside of a MySQL string literal.
///
/// MySQL treats backslash as an escape character inside quoted strings, so
/// quote doubling alone is not enough.
#[must_use]
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders a timestamp as a timezone-explicit literal.
///
/// The wall-clock text is the caller's local time and the conversion states
/// the caller's UTC offset, so the server converts into its own session
/// timezone instead of assuming it matches the application's.
#[must_use]
pub fn escape_datetime(value: &DateTime<FixedOffset>) -> String {
    let wall_clock = value.format("%Y-%m-%d %H:%M:%S");
    let offset_seconds = value.offset().local_minus_utc();
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let abs = offset_seconds.unsigned_abs();
    format!(
        "CONVERT_TZ('{wall_clock}','{sign}{:02}:{:02}', @@session.time_zone)",
        abs / 3600,
        (abs % 3600) / 60
    )
}

/// Renders a binary blob as a hexadecimal literal.
#[must_use]
pub fn escape_blob(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out.push('\'');
    out
}
