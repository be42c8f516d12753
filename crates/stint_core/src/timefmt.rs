//! Fixed-format time codec for the task text format.
//!
//! Timestamps are `YYYY-MM-DD HH:MM:SS`, always UTC wall clock; values are
//! integer epoch seconds. Durations render as `HH:MM:SS` with unbounded
//! hours.

use crate::error::AppError;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Formats epoch seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn encode_timestamp(epoch_seconds: i64) -> Result<String, AppError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let moment = OffsetDateTime::from_unix_timestamp(epoch_seconds)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    moment
        .format(&format)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp back to epoch seconds.
///
/// Strict: the input must be exactly 19 characters with zero-padded fields,
/// the year must be `20xx`, and every field must be in range. Calendar
/// impossibilities (a 30th of February) are rejected as well.
pub fn decode_timestamp(text: &str) -> Result<i64, AppError> {
    if !has_timestamp_shape(text) || !text.starts_with("20") {
        return Err(AppError::parse(format!(
            "expected timestamp YYYY-MM-DD HH:MM:SS, found '{text}'"
        )));
    }

    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let parsed = PrimitiveDateTime::parse(text, &format)
        .map_err(|_| AppError::parse(format!("timestamp '{text}' has a field out of range")))?;
    Ok(parsed.assume_utc().unix_timestamp())
}

/// Formats a non-negative number of seconds as `HH:MM:SS`.
pub fn encode_duration(total_seconds: i64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn has_timestamp_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            10 => *byte == b' ',
            13 | 16 => *byte == b':',
            _ => byte.is_ascii_digit(),
        })
}
