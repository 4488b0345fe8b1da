use super::{CompletionService, GenParams, Message};
use crate::models::IntentResult;

const INTENT_PROMPT: &str = r#"You are an intent/slot extractor for a clinic assistant.
Return ONLY compact JSON with:
  intent: one of ['small_talk','show_appointments','book_appointment','update_payment','create_report','calc','get_time','show_client_stats']
  name? : patient/client name if present
  date? : dd-mm-yyyy if present (convert natural dates)
  time? : hh:mm AM/PM if present
  amount?: number if about payments (no currency symbol)
  expression?: the arithmetic expression for calc

Rules:
- Greetings/chit-chat/uncertain -> small_talk.
- Use 'calc' ONLY if the user clearly asks a math calculation.
- Use 'get_time' for date/time questions.
- Only book_appointment when the user clearly wants to schedule.
No commentary, JSON only.

Examples:
User: "hi"
{"intent":"small_talk"}

User: "show my appointments"
{"intent":"show_appointments"}

User: "book muhammad on 13 july at 3pm"
{"intent":"book_appointment","name":"Muhammad","date":"13-07-2025","time":"03:00 PM"}
"#;

/// Ask the completion service to classify a single utterance. Returns `None`
/// when the call fails or the reply carries no parseable JSON object; the
/// caller falls back to the regex baseline in that case. Never errors.
pub async fn classify(llm: &dyn CompletionService, utterance: &str) -> Option<IntentResult> {
    let messages = vec![Message {
        role: "user".to_string(),
        content: utterance.to_string(),
    }];

    match llm.complete(INTENT_PROMPT, &messages, GenParams::ROUTING).await {
        Ok(raw) => parse_intent_response(&raw),
        Err(e) => {
            tracing::warn!(error = %e, "intent classification call failed");
            None
        }
    }
}

/// Pull the first `{...}` window out of a possibly-noisy completion and
/// decode it. Unknown intents and missing fields are absorbed by the
/// `IntentResult` serde defaults.
fn parse_intent_response(raw: &str) -> Option<IntentResult> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<IntentResult>(&raw[start..=end]) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse classifier JSON");
            None
        }
    }
}
