//! Calendar-day helpers. Days are evaluated on the configured wall clock.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime, UtcOffset,
};

/// Serialize a [`Date`] as `YYYY-MM-DD`.
pub mod day_format {
    use serde::Serializer;
    use time::Date;

    pub fn serialize<S: Serializer>(day: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_day(*day))
    }
}

pub fn format_day(day: Date) -> String {
    day.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| day.to_string())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_day(raw: &str, offset: UtcOffset) -> Result<Date, String> {
    let raw = raw.trim();
    if let Ok(d) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Ok(d);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|t| t.to_offset(offset).date())
        .map_err(|_| format!("invalid date: {raw}"))
}

pub fn local_day(at: OffsetDateTime, offset: UtcOffset) -> Date {
    at.to_offset(offset).date()
}

pub fn today(offset: UtcOffset) -> Date {
    local_day(OffsetDateTime::now_utc(), offset)
}

/// `[start, end)` of a calendar day.
pub fn day_bounds(day: Date, offset: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    let start = day.midnight().assume_offset(offset);
    (start, start + Duration::days(1))
}
