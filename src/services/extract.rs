//! Regex-first slot extraction. This baseline always runs; model output
//! patches it when the classifier produced something. With the null
//! completion service configured, this is the whole router.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::{nldate, normalize};
use crate::models::{Intent, IntentResult};

pub static BOOKING_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(book|schedule|appointment|appt|reserve|set\s*up|arrange|make\s+an?\s+appointment|see\s+(?:dr|doctor))\b",
    )
    .expect("valid regex")
});

pub static PAYMENT_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pay|paid|payments?|deposits?|balance|invoices?|amounts?|receipts?)\b")
        .expect("valid regex")
});

pub static REPORT_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(reports?|summary|notes?|letters?|prescriptions?)\b").expect("valid regex")
});

pub static SHOW_APPTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(show|list|view|see|display)\b.*\b(appointments?|appts?)\b")
        .expect("valid regex")
});

pub static STATS_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(stats?|statistics)\b|\bclient\s+stats?\b").expect("valid regex")
});

static CALC_CUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcalc(ulate)?\b|\bcompute\b").expect("valid regex"));

static TIME_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwhat\s+(time|day|date)\b|\btime\s+now\b|\btoday'?s\s+date\b")
        .expect("valid regex")
});

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"(?i)\b(?:person\s+name|patient\s+name|client\s+name|name\s+is)\s+([a-z][\w'-]*(?:\s+[a-z][\w'-]*){0,3})",
        )
        .expect("valid regex"),
        Regex::new(r"(?i)\bfor\s+([a-z][\w'-]*(?:\s+[a-z][\w'-]*){0,3})").expect("valid regex"),
    ]
});

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\s*(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)").expect("valid regex")
});

// Tokens that end a captured name span: the capture is greedy over words,
// so "jane smith on friday" must be cut back to "jane smith".
const NAME_STOPWORDS: &[&str] = &[
    "on", "at", "to", "by", "for", "this", "next", "today", "tomorrow", "am", "pm", "the",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

fn guess_intent(text: &str) -> Intent {
    if SHOW_APPTS_RE.is_match(text) {
        return Intent::ShowAppointments;
    }
    if BOOKING_CUE_RE.is_match(text) {
        return Intent::BookAppointment;
    }
    if PAYMENT_CUE_RE.is_match(text) {
        return Intent::UpdatePayment;
    }
    if REPORT_CUE_RE.is_match(text) {
        return Intent::CreateReport;
    }
    if CALC_CUE_RE.is_match(text) {
        return Intent::Calc;
    }
    if TIME_QUESTION_RE.is_match(text) {
        return Intent::GetTime;
    }
    if STATS_CUE_RE.is_match(text) {
        return Intent::ShowClientStats;
    }
    Intent::SmallTalk
}

/// Name from explicit phrasing ("name is X", "for X"), cut at the first
/// connective token and title-cased.
pub fn find_name(text: &str) -> Option<String> {
    for pattern in NAME_PATTERNS.iter() {
        if let Some(c) = pattern.captures(text) {
            let raw = c.get(1).map(|g| g.as_str()).unwrap_or("");
            let mut words: Vec<&str> = Vec::new();
            for word in raw.split_whitespace() {
                if NAME_STOPWORDS.contains(&word.to_lowercase().as_str()) {
                    break;
                }
                if word.chars().any(|ch| ch.is_ascii_digit()) {
                    break;
                }
                words.push(word);
            }
            if !words.is_empty() {
                return Some(normalize::titlecase(&words.join(" ")));
            }
        }
    }
    None
}

/// Amount digits, only when the text is actually about money.
fn find_amount(text: &str) -> Option<String> {
    if !PAYMENT_CUE_RE.is_match(text) {
        return None;
    }
    AMOUNT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|g| g.as_str().to_string())
}

/// Baseline route for one utterance: keyword intent guess plus whatever
/// slots the text gives up. The time slot is only set when the user
/// actually said a clock time.
pub fn route_regex(text: &str, now: NaiveDateTime) -> IntentResult {
    let mut result = IntentResult {
        intent: guess_intent(text),
        ..IntentResult::default()
    };

    result.name = find_name(text);

    if let Some(date) = nldate::find_date(text, now.date()) {
        result.date = Some(date.format("%d-%m-%Y").to_string());
        if nldate::has_clock_time(text) {
            if let Some(t) = nldate::find_time_12h(text) {
                result.time = Some(nldate::format_time_12h(t));
            }
        }
    }

    result.amount = find_amount(text);
    result
}

/// Merge the model's routing over the regex baseline: the model's intent
/// and slots win wherever present, the baseline fills the gaps. `None`
/// means the classifier had nothing usable and the baseline stands alone.
pub fn route_hybrid(
    model: Option<IntentResult>,
    text: &str,
    now: NaiveDateTime,
) -> IntentResult {
    let mut slots = route_regex(text, now);

    if let Some(model) = model {
        slots.intent = model.intent;
        slots.name = model.name.or(slots.name);
        slots.date = model.date.or(slots.date);
        slots.time = model.time.or(slots.time);
        slots.amount = model.amount.or(slots.amount);
        slots.expression = model.expression.or(slots.expression);
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_guess_booking() {
        let r = route_regex("book appointment for Jane Smith on Friday at 10:30 AM", monday_noon());
        assert_eq!(r.intent, Intent::BookAppointment);
        assert_eq!(r.name.as_deref(), Some("Jane Smith"));
        assert_eq!(r.date.as_deref(), Some("07-08-2026"));
        assert_eq!(r.time.as_deref(), Some("10:30 AM"));
    }

    #[test]
    fn test_guess_show_appointments() {
        let r = route_regex("show my appointments", monday_noon());
        assert_eq!(r.intent, Intent::ShowAppointments);
    }

    #[test]
    fn test_guess_payment_with_amount() {
        let r = route_regex("update payment for John Doe to 200", monday_noon());
        assert_eq!(r.intent, Intent::UpdatePayment);
        assert_eq!(r.name.as_deref(), Some("John Doe"));
        assert_eq!(r.amount.as_deref(), Some("200"));
    }

    #[test]
    fn test_amount_handles_separators_and_decimals() {
        let r = route_regex("john doe paid $1,250.50", monday_noon());
        assert_eq!(r.amount.as_deref(), Some("1,250.50"));
        let r = route_regex("john doe paid 1250.50", monday_noon());
        assert_eq!(r.amount.as_deref(), Some("1250.50"));
    }

    #[test]
    fn test_amount_requires_payment_vocabulary() {
        let r = route_regex("the code is 1234", monday_noon());
        assert_eq!(r.amount, None);
    }

    #[test]
    fn test_name_cut_at_stopword() {
        assert_eq!(
            find_name("book for jane smith on friday").as_deref(),
            Some("Jane Smith")
        );
    }

    #[test]
    fn test_explicit_name_phrasing() {
        assert_eq!(
            find_name("patient name muhammad ali").as_deref(),
            Some("Muhammad Ali")
        );
    }

    #[test]
    fn test_no_time_slot_without_clock_mention() {
        let r = route_regex("book jane for friday", monday_noon());
        assert_eq!(r.time, None);
    }

    #[test]
    fn test_small_talk_fallthrough() {
        let r = route_regex("how are you doing", monday_noon());
        assert_eq!(r.intent, Intent::SmallTalk);
    }

    #[test]
    fn test_hybrid_prefers_model_intent_and_slots() {
        let model = IntentResult {
            intent: Intent::BookAppointment,
            name: Some("Jane Smith".to_string()),
            date: Some("13-07-2026".to_string()),
            ..IntentResult::default()
        };
        let merged = route_hybrid(Some(model), "whatever the model said", monday_noon());
        assert_eq!(merged.intent, Intent::BookAppointment);
        assert_eq!(merged.date.as_deref(), Some("13-07-2026"));
    }

    #[test]
    fn test_hybrid_without_model_keeps_baseline() {
        let merged = route_hybrid(None, "show my appointments", monday_noon());
        assert_eq!(merged.intent, Intent::ShowAppointments);
    }
}
