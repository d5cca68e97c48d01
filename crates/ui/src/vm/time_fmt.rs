use chrono::{DateTime, Utc};

/// `Nov 14, 2023`
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

/// `November 14, 2023`
#[must_use]
pub fn format_long_date(value: DateTime<Utc>) -> String {
    value.format("%B %-d, %Y").to_string()
}

#[must_use]
pub fn format_login(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "Never".to_owned(),
        |at| at.format("%B %-d, %Y %H:%M UTC").to_string(),
    )
}
