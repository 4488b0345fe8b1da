//! Deterministic veto layer over the classifier. LLM routers hallucinate
//! action intents from ambiguous phrasing; every actionable intent must be
//! corroborated by a signal in the raw text or it is downgraded to
//! small talk. Rules run in order, first match wins, no model calls.

use std::sync::LazyLock;

use regex::Regex;

use super::extract;
use crate::models::{Intent, IntentResult};

static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(hi|hello|hey|yo|sup|thanks|thank you|good (morning|afternoon|evening))[.!\s]*$")
        .expect("valid regex")
});

static ARITHMETIC_SIGNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[+*/%=]|\d\s*-\s*\d|\b(calc|calculate|compute|math|sum|plus|minus|times|divided)\b")
        .expect("valid regex")
});

static TIME_SIGNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(time|date|day|today|now|clock)\b").expect("valid regex")
});

static APPTS_SIGNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(appointments?|appts?)\b").expect("valid regex"));

static STATS_SIGNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(stats?|statistics|clients?|patients?)\b").expect("valid regex")
});

/// Greeting or trivially short chit-chat.
pub fn is_greeting(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() <= 2 || GREETING_RE.is_match(trimmed)
}

fn required_signal(intent: Intent) -> Option<&'static Regex> {
    match intent {
        Intent::BookAppointment => Some(&extract::BOOKING_CUE_RE),
        Intent::UpdatePayment => Some(&extract::PAYMENT_CUE_RE),
        Intent::CreateReport => Some(&extract::REPORT_CUE_RE),
        Intent::ShowAppointments => Some(&APPTS_SIGNAL_RE),
        Intent::ShowClientStats => Some(&STATS_SIGNAL_RE),
        Intent::GetTime => Some(&TIME_SIGNAL_RE),
        Intent::Calc | Intent::SmallTalk => None,
    }
}

/// Downgrade the routed intent when the raw text does not corroborate it.
pub fn gate(mut result: IntentResult, utterance: &str) -> IntentResult {
    if is_greeting(utterance) {
        result.intent = Intent::SmallTalk;
        return result;
    }

    if result.intent == Intent::Calc {
        if !ARITHMETIC_SIGNAL_RE.is_match(utterance) {
            result.intent = Intent::SmallTalk;
            result.expression = None;
        }
        return result;
    }

    if let Some(signal) = required_signal(result.intent) {
        if !signal.is_match(utterance) {
            tracing::debug!(intent = result.intent.as_str(), "gate downgraded intent");
            result.intent = Intent::SmallTalk;
        }
    }

    result
}
