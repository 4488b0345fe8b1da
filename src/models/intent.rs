use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of actions the assistant can route a chat turn to. Anything
/// the classifier emits outside this set parses to `SmallTalk`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ShowAppointments,
    BookAppointment,
    UpdatePayment,
    CreateReport,
    Calc,
    GetTime,
    ShowClientStats,
    SmallTalk,
}

impl Default for Intent {
    fn default() -> Self {
        Intent::SmallTalk
    }
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ShowAppointments => "show_appointments",
            Intent::BookAppointment => "book_appointment",
            Intent::UpdatePayment => "update_payment",
            Intent::CreateReport => "create_report",
            Intent::Calc => "calc",
            Intent::GetTime => "get_time",
            Intent::ShowClientStats => "show_client_stats",
            Intent::SmallTalk => "small_talk",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "show_appointments" => Intent::ShowAppointments,
            "book_appointment" => Intent::BookAppointment,
            "update_payment" => Intent::UpdatePayment,
            "create_report" => Intent::CreateReport,
            "calc" => Intent::Calc,
            "get_time" => Intent::GetTime,
            "show_client_stats" => Intent::ShowClientStats,
            _ => Intent::SmallTalk,
        }
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Intent::parse(&s))
    }
}

/// One routed chat turn: the intent plus whatever slots were extracted.
/// All slots are raw text as found in the utterance or the model output;
/// normalization happens later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentResult {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub amount: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
}

/// Small models return `"amount": 200` as often as `"amount": "200"`.
fn de_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_intent_falls_back_to_small_talk() {
        let parsed: IntentResult =
            serde_json::from_str(r#"{"intent":"launch_rocket"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::SmallTalk);
    }

    #[test]
    fn test_missing_intent_defaults_to_small_talk() {
        let parsed: IntentResult = serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::SmallTalk);
        assert_eq!(parsed.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_known_intents_round_trip() {
        for intent in [
            Intent::ShowAppointments,
            Intent::BookAppointment,
            Intent::UpdatePayment,
            Intent::CreateReport,
            Intent::Calc,
            Intent::GetTime,
            Intent::ShowClientStats,
            Intent::SmallTalk,
        ] {
            assert_eq!(Intent::parse(intent.as_str()), intent);
        }
    }

    #[test]
    fn test_numeric_amount_accepted() {
        let parsed: IntentResult =
            serde_json::from_str(r#"{"intent":"update_payment","amount":200}"#).unwrap();
        assert_eq!(parsed.intent, Intent::UpdatePayment);
        assert_eq!(parsed.amount.as_deref(), Some("200"));
    }
}
