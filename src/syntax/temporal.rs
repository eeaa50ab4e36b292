//! Temporal declarations: hidden names shaped like a date-time literal, e.g. `@@(1905-12-24 12:00)`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Whether a hidden name has the temporal shape: it starts with a digit, `@` or `-`.
pub fn is_temporal_token(token: &str) -> bool {
    matches!(token.chars().next(), Some(c) if c.is_ascii_digit() || c == '@' || c == '-')
}

/// Parse a temporal literal. The first space is read as the date/time separator.
///
/// Accepts RFC 3339 timestamps (normalised to UTC), `YYYY-MM-DDTHH:MM[:SS[.fff]]`, a bare
/// `YYYY-MM-DD`, `YYYY-MM` and `YYYY`. Anything else yields `None`.
pub fn parse_date_time(token: &str) -> Option<NaiveDateTime> {
    let literal = token.trim().replacen(' ', "T", 1);

    if let Ok(stamp) = DateTime::parse_from_rfc3339(&literal) {
        return Some(stamp.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(&literal, format) {
            return Some(stamp);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&literal, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    partial_date(&literal).map(|date| date.and_time(NaiveTime::MIN))
}

fn partial_date(literal: &str) -> Option<NaiveDate> {
    let mut parts = literal.split('-');
    let year = parts.next()?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = match parts.next() {
        Some(month) if month.len() == 2 => month.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}
