//! Currency, date and text formatting.

use chrono::{DateTime, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const RELATIVE_DAYS_LIMIT: i64 = 30;

/// Formats minor units as an en-US currency string with two decimals.
///
/// Known codes get a symbol prefix (`$6,529,770.00`); unknown codes are
/// appended (`1,234.00 XYZ`).
pub fn format_currency(minor_units: i64, currency: &str) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let magnitude = minor_units.unsigned_abs();
    let number = format!(
        "{}.{:02}",
        group_thousands(magnitude / 100),
        magnitude % 100
    );

    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{number} {}", currency.trim().to_ascii_uppercase()),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "NGN" => Some("₦"),
        "INR" => Some("₹"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `November 27, 2022`.
pub fn format_long_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y").to_string()
}

/// `Sunday, November 27, 2022`; the invoice list group heading.
pub fn format_weekday_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%A, %B %-d, %Y").to_string()
}

/// "Just now", "5 minutes ago", "1 hour ago", "3 days ago", then the long
/// date once the gap reaches 30 days. Future timestamps read "Just now".
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = (*now - *timestamp).num_seconds();

    if elapsed < SECONDS_PER_MINUTE {
        "Just now".to_string()
    } else if elapsed < SECONDS_PER_HOUR {
        plural_ago(elapsed / SECONDS_PER_MINUTE, "minute")
    } else if elapsed < SECONDS_PER_DAY {
        plural_ago(elapsed / SECONDS_PER_HOUR, "hour")
    } else if elapsed < RELATIVE_DAYS_LIMIT * SECONDS_PER_DAY {
        plural_ago(elapsed / SECONDS_PER_DAY, "day")
    } else {
        format_long_date(timestamp)
    }
}

fn plural_ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Feed timestamp: "Today, 2:20 PM" within 24 hours, "Yesterday, 2:20 PM"
/// within 48 hours, otherwise "Nov 27, 2:20 PM".
pub fn format_activity_timestamp(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let hours = (*now - *timestamp).num_hours();
    let clock = timestamp.format("%-I:%M %p");

    if hours < 24 {
        format!("Today, {clock}")
    } else if hours < 48 {
        format!("Yesterday, {clock}")
    } else {
        timestamp.format("%b %-d, %-I:%M %p").to_string()
    }
}

/// Truncates to `max_chars` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
