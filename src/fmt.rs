use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::{MoneypitError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Unix timestamp (UTC midnight) for an ISO `%Y-%m-%d` date string.
pub fn timestamp_from_date(date: &str) -> Result<i64> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| MoneypitError::BadDate(date.to_string(), e.to_string()))?;
    Ok(parsed
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp())
}

pub fn today_string() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// `%Y-%m` bucket key for a unix timestamp. Sqlite has no date type, so
/// monthly grouping happens on this side.
pub fn month_key(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m").to_string(),
        None => String::from("????-??"),
    }
}

pub fn format_timestamp(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => format!("Not a Timestamp: {timestamp}"),
    }
}
