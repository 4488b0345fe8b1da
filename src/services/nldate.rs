//! Date/time phrase parsing over a closed grammar: explicit numeric dates,
//! month names, weekday names, today/tomorrow, and 12h/24h clock times.
//! Relative phrases resolve with a future preference ("Friday" said on a
//! Monday means the coming Friday).

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid regex"));

// Day-first numeric, the clinic's wire format: 13-07-2026, 13/7, 13-07-26.
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[-/](\d{1,2})(?:[-/](\d{2,4}))?\b").expect("valid regex"));

static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:\s+(\d{4}))?",
    )
    .expect("valid regex")
});

static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?\b",
    )
    .expect("valid regex")
});

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:next\s+|this\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues?|wed|thurs?|thu|fri|sat|sun)\b",
    )
    .expect("valid regex")
});

static TODAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btoday\b").expect("valid regex"));
static TOMORROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btomorrow\b").expect("valid regex"));

static TIME_12H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*([ap])\.?m\.?\b").expect("valid regex")
});
static TIME_24H_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("valid regex"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b20\d{2}\b").expect("valid regex"));

/// Whether the text literally states a 4-digit year. Drives the
/// roll-forward rule in date normalization.
pub fn has_explicit_year(text: &str) -> bool {
    YEAR_RE.is_match(text)
}

/// Whether the text carries an AM/PM clock time.
pub fn has_clock_time(text: &str) -> bool {
    TIME_12H_RE.is_match(text)
}

/// Scan free text for the first recognizable date phrase. More explicit
/// forms win over relative ones.
pub fn find_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(c) = ISO_DATE_RE.captures(text) {
        let (y, m, d) = (num(&c, 1), num(&c, 2), num(&c, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    if let Some(c) = NUMERIC_DATE_RE.captures(text) {
        let (d, m) = (num(&c, 1), num(&c, 2));
        let year = c.get(3).map(|g| expand_year(g.as_str())).unwrap_or(today.year());
        if let Some(date) = NaiveDate::from_ymd_opt(year, m, d) {
            return Some(date);
        }
    }

    if let Some(c) = DAY_FIRST_RE.captures(text) {
        let d = num(&c, 1);
        if let Some(m) = month_number(c.get(2).map(|g| g.as_str()).unwrap_or("")) {
            let year = c.get(3).map(|g| expand_year(g.as_str())).unwrap_or(today.year());
            if let Some(date) = NaiveDate::from_ymd_opt(year, m, d) {
                return Some(date);
            }
        }
    }

    if let Some(c) = MONTH_FIRST_RE.captures(text) {
        if let Some(m) = month_number(c.get(1).map(|g| g.as_str()).unwrap_or("")) {
            let d = num(&c, 2);
            let year = c.get(3).map(|g| expand_year(g.as_str())).unwrap_or(today.year());
            if let Some(date) = NaiveDate::from_ymd_opt(year, m, d) {
                return Some(date);
            }
        }
    }

    if TODAY_RE.is_match(text) {
        return Some(today);
    }
    if TOMORROW_RE.is_match(text) {
        return Some(today + Duration::days(1));
    }

    if let Some(c) = WEEKDAY_RE.captures(text) {
        if let Some(wd) = weekday_from_name(c.get(1).map(|g| g.as_str()).unwrap_or("")) {
            return Some(next_weekday(today, wd));
        }
    }

    None
}

/// First 12-hour clock time in the text ("3pm", "10:30 AM").
pub fn find_time_12h(text: &str) -> Option<NaiveTime> {
    let c = TIME_12H_RE.captures(text)?;
    let hour12 = num(&c, 1);
    if !(1..=12).contains(&hour12) {
        return None;
    }
    let minute = c.get(2).and_then(|g| g.as_str().parse::<u32>().ok()).unwrap_or(0);
    let pm = c
        .get(3)
        .map(|g| g.as_str().eq_ignore_ascii_case("p"))
        .unwrap_or(false);

    let hour = (hour12 % 12) + if pm { 12 } else { 0 };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// First 24-hour `HH:MM` in the text.
pub fn find_time_24h(text: &str) -> Option<NaiveTime> {
    let c = TIME_24H_RE.captures(text)?;
    NaiveTime::from_hms_opt(num(&c, 1), num(&c, 2), 0)
}

/// Render a time in the wire format: zero-padded `hh:mm AM/PM`.
pub fn format_time_12h(t: NaiveTime) -> String {
    t.format("%I:%M %p").to_string()
}

fn num(captures: &regex::Captures<'_>, index: usize) -> u32 {
    captures
        .get(index)
        .and_then(|g| g.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

fn expand_year(raw: &str) -> i32 {
    match raw.parse::<i32>() {
        Ok(y) if y < 100 => 2000 + y,
        Ok(y) => y,
        Err(_) => 0,
    }
}

fn month_number(name: &str) -> Option<u32> {
    let key = name.to_lowercase();
    let idx = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ]
    .iter()
    .position(|m| key.starts_with(m))?;
    Some(idx as u32 + 1)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.to_lowercase().get(..3)? {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next occurrence of the weekday strictly after `today`.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(ahead)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        // 2026-08-03 is a Monday.
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn test_numeric_date() {
        let d = find_date("book jane on 13-07-2026 please", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 7, 13).unwrap());
    }

    #[test]
    fn test_numeric_date_without_year_uses_current() {
        let d = find_date("see dr on 13/07", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 7, 13).unwrap());
    }

    #[test]
    fn test_iso_date() {
        let d = find_date("2026-07-13 works for me", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 7, 13).unwrap());
    }

    #[test]
    fn test_day_first_month_name() {
        let d = find_date("book muhammad on 13 july at 3pm", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 7, 13).unwrap());
    }

    #[test]
    fn test_month_first_with_year() {
        let d = find_date("July 13, 2027", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2027, 7, 13).unwrap());
    }

    #[test]
    fn test_weekday_resolves_forward() {
        let d = find_date("book for Friday", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
        assert_eq!(d.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_same_weekday_jumps_a_week() {
        let d = find_date("monday", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 10).unwrap());
    }

    #[test]
    fn test_tomorrow() {
        let d = find_date("come in tomorrow", monday()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
    }

    #[test]
    fn test_weekday_not_matched_inside_words() {
        assert!(find_date("my friend saturates sundaes monthly", monday())
            .map(|d| d.weekday())
            .is_none());
    }

    #[test]
    fn test_time_12h_variants() {
        assert_eq!(
            find_time_12h("at 10:30 AM").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(
            find_time_12h("around 3pm").unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap()
        );
        assert_eq!(
            find_time_12h("12 a.m.").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_time_24h() {
        assert_eq!(
            find_time_24h("come at 15:45").unwrap(),
            NaiveTime::from_hms_opt(15, 45, 0).unwrap()
        );
        assert!(find_time_24h("no time here").is_none());
    }

    #[test]
    fn test_format_time_12h_zero_padded() {
        let t = NaiveTime::from_hms_opt(15, 5, 0).unwrap();
        assert_eq!(format_time_12h(t), "03:05 PM");
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(format_time_12h(noon), "12:00 PM");
    }

    #[test]
    fn test_has_explicit_year() {
        assert!(has_explicit_year("on 13-07-2026"));
        assert!(!has_explicit_year("on friday at 10"));
    }
}
