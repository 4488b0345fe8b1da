//! Canonicalization of extracted slots. Every function here is total: bad
//! input degrades to a documented default or `None`, never an error.

use chrono::{Datelike, Duration, NaiveDateTime};

use super::nldate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    /// Wire format, `dd-mm-yyyy`.
    pub date: String,
    /// Human form for confirmation prompts, `Month DD, YYYY`.
    pub pretty: String,
}

/// Resolve a date slot against the raw utterance. Tries the slot text
/// first, then the whole utterance, then falls back to today. When the
/// source text states no 4-digit year and the resolved date is already
/// past, the date rolls forward one year ("book for Friday" means the
/// coming Friday, not last week's).
pub fn normalize_date(raw: &str, context: &str, now: NaiveDateTime) -> NormalizedDate {
    let today = now.date();
    let parsed = nldate::find_date(raw, today).or_else(|| nldate::find_date(context, today));

    let resolved = match parsed {
        Some(mut date) => {
            let source = if raw.trim().is_empty() { context } else { raw };
            if !nldate::has_explicit_year(source) && date < today {
                date = date
                    .with_year(date.year() + 1)
                    .unwrap_or(date + Duration::days(365));
            }
            date
        }
        None => today,
    };

    NormalizedDate {
        date: resolved.format("%d-%m-%Y").to_string(),
        pretty: resolved.format("%B %d, %Y").to_string(),
    }
}

/// Resolve a time slot: 12-hour parse of the slot, then a clock scan of the
/// utterance (12h then 24h), defaulting to noon. Output is re-rendered so
/// casing and padding are always canonical.
pub fn normalize_time(raw: &str, context: &str) -> String {
    let time = nldate::find_time_12h(raw)
        .or_else(|| nldate::find_time_24h(raw))
        .or_else(|| nldate::find_time_12h(context))
        .or_else(|| nldate::find_time_24h(context));

    match time {
        Some(t) => nldate::format_time_12h(t),
        None => "12:00 PM".to_string(),
    }
}

/// Capitalize each whitespace-delimited token. Empty input stays empty; the
/// caller is responsible for prompting on a missing name.
pub fn titlecase(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a money amount, stripping currency symbols and thousands
/// separators. Non-numeric input yields `None`, never zero — a garbage
/// amount must not silently record a zero payment.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .trim()
        .to_string();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
