//! Per-turn engine for one chat session: confirmation handling first, then
//! classify → gate → normalize → dispatch, falling back to free-form chat.
//! Session state (history, pending action) is snapshotted out of the session
//! map, mutated locally, and written back, so no lock is held across an
//! await.

use std::sync::Arc;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tokio::sync::Notify;

use crate::db::store::SqliteStore;
use crate::models::{Appointment, ChatMessage, ChatSession, PendingAction};
use crate::services::ai::{classifier, GenParams, Message};
use crate::services::dispatch::{self, ActionCollaborators, Outcome};
use crate::services::{extract, gate};
use crate::state::AppState;

const SYSTEM_PROMPT: &str = "You are a concise, friendly medical assistant for a small clinic. \
You can chat naturally, but keep replies brief. If you don't understand or miss key details, \
ask a short clarifying question. If the user asks what you can do, briefly list: \
show appointments, book appointments (with confirmation), update payments, and draft quick reports. \
Do not write role labels. No HTML.";

const HISTORY_WINDOW: usize = 10;

const AFFIRMATIVE: &[&str] = &["yes", "y", "ok", "okay", "confirm", "sure"];
const NEGATIVE: &[&str] = &["no", "n", "cancel", "stop"];

static CAPABILITIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(what can you do|help me with|capabilities|tasks)\b").expect("valid regex")
});

#[derive(Debug)]
pub struct TurnOutput {
    pub reply: String,
    pub intent: String,
}

pub async fn process_message(state: &Arc<AppState>, session_id: &str, text: &str) -> TurnOutput {
    let now = Local::now().naive_local();
    let trimmed = text.trim();

    let (messages, pending) = {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ChatSession::new(session_id.to_string(), now));
        (session.messages.clone(), session.pending.clone())
    };

    let store = SqliteStore::new(Arc::clone(&state.db));
    let collab = ActionCollaborators {
        appointments: &store,
        accounts: &store,
        events: &state.events_tx,
    };

    // A pending action owns the turn before any classification happens.
    if let Some(action) = pending {
        match action {
            PendingAction::AwaitingConfirmation { appointment, .. } => {
                let lower = trimmed.to_lowercase();
                if AFFIRMATIVE.contains(&lower.as_str()) {
                    let reply = dispatch::commit_booking(&appointment, &collab);
                    return finish(
                        state, session_id, messages, None, trimmed, &reply, true,
                        "book_appointment", now,
                    );
                }
                if NEGATIVE.contains(&lower.as_str()) {
                    return finish(
                        state, session_id, messages, None, trimmed,
                        "Okay, I won't book it.", true, "book_appointment", now,
                    );
                }
                // Anything else cancels the pending booking; the utterance
                // is then routed as a fresh turn.
                tracing::debug!(session = session_id, "pending booking dropped by unrelated reply");
            }
            PendingAction::NameRequired {
                date,
                time,
                pretty_date,
            } => {
                if let Some(name) = name_from_reply(trimmed) {
                    let reply = format!(
                        "Would you like me to book {name} on {pretty_date} at {time}? (yes/no)"
                    );
                    let next = PendingAction::AwaitingConfirmation {
                        appointment: Appointment { name, date, time },
                        pretty_date,
                    };
                    return finish(
                        state, session_id, messages, Some(next), trimmed, &reply, true,
                        "book_appointment", now,
                    );
                }
                tracing::debug!(session = session_id, "name prompt dropped by unrelated reply");
            }
        }
    }

    let model = classifier::classify(state.llm.as_ref(), trimmed).await;
    let routed = extract::route_hybrid(model, trimmed, now);
    let routed = gate::gate(routed, trimmed);
    tracing::info!(
        session = session_id,
        intent = routed.intent.as_str(),
        "routed chat turn"
    );

    let intent = routed.intent.as_str();
    match dispatch::dispatch(&routed, trimmed, &collab, now) {
        Outcome::Reply(reply) => {
            finish(state, session_id, messages, None, trimmed, &reply, true, intent, now)
        }
        Outcome::Confirm {
            appointment,
            pretty_date,
            reply,
        } => {
            let next = PendingAction::AwaitingConfirmation {
                appointment,
                pretty_date,
            };
            finish(state, session_id, messages, Some(next), trimmed, &reply, true, intent, now)
        }
        Outcome::NeedName {
            date,
            time,
            pretty_date,
            reply,
        } => {
            let next = PendingAction::NameRequired {
                date,
                time,
                pretty_date,
            };
            finish(state, session_id, messages, Some(next), trimmed, &reply, true, intent, now)
        }
        Outcome::FreeChat => {
            if CAPABILITIES_RE.is_match(trimmed) {
                let reply = "I can show appointments, book appointments (with confirmation), \
update payments, and draft quick reports.";
                return finish(
                    state, session_id, messages, None, trimmed, reply, true, intent, now,
                );
            }
            free_chat(state, session_id, messages, trimmed, now).await
        }
    }
}

/// Cancel an in-flight free-chat generation for a session. Returns whether
/// one was active. Partial output is discarded by the select in
/// `free_chat`, so history stays consistent.
pub fn stop_generation(state: &AppState, session_id: &str) -> bool {
    let active = state.active_chats.lock().unwrap();
    match active.get(session_id) {
        Some(notify) => {
            notify.notify_waiters();
            true
        }
        None => false,
    }
}

async fn free_chat(
    state: &Arc<AppState>,
    session_id: &str,
    messages: Vec<ChatMessage>,
    user_text: &str,
    now: NaiveDateTime,
) -> TurnOutput {
    let notify = Arc::new(Notify::new());
    state
        .active_chats
        .lock()
        .unwrap()
        .insert(session_id.to_string(), Arc::clone(&notify));

    let mut turns = messages.clone();
    turns.push(ChatMessage::user(user_text));
    let window: Vec<Message> = turns
        .iter()
        .skip(turns.len().saturating_sub(HISTORY_WINDOW))
        .map(|m| Message {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();

    let result = tokio::select! {
        res = state.llm.complete(SYSTEM_PROMPT, &window, GenParams::CHAT) => Some(res),
        _ = notify.notified() => None,
    };

    state.active_chats.lock().unwrap().remove(session_id);

    match result {
        None => {
            tracing::info!(session = session_id, "free chat generation stopped by user");
            finish(
                state, session_id, messages, None, user_text, "⏹️ Stopped.", false,
                "small_talk", now,
            )
        }
        Some(Ok(text)) => {
            let reply = text.trim().to_string();
            let reply = if reply.is_empty() {
                fallback_reply(user_text).to_string()
            } else {
                reply
            };
            finish(
                state, session_id, messages, None, user_text, &reply, true, "small_talk", now,
            )
        }
        Some(Err(e)) => {
            tracing::error!(session = session_id, error = %e, "free chat generation failed");
            finish(
                state, session_id, messages, None, user_text, fallback_reply(user_text), true,
                "small_talk", now,
            )
        }
    }
}

fn fallback_reply(user_text: &str) -> &'static str {
    if gate::is_greeting(user_text) {
        "Hello! How can I help you today?"
    } else {
        "Got it. How else can I help?"
    }
}

/// Re-validate a follow-up utterance as a patient name: explicit phrasing
/// wins, otherwise the whole reply qualifies only when it is a few plain
/// words that don't read as a new request.
fn name_from_reply(text: &str) -> Option<String> {
    if let Some(name) = extract::find_name(text) {
        return Some(name);
    }

    if gate::is_greeting(text)
        || extract::BOOKING_CUE_RE.is_match(text)
        || extract::PAYMENT_CUE_RE.is_match(text)
        || extract::REPORT_CUE_RE.is_match(text)
        || extract::SHOW_APPTS_RE.is_match(text)
        || extract::STATS_CUE_RE.is_match(text)
    {
        return None;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let plausible = !words.is_empty()
        && words.len() <= 4
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-'));
    if plausible {
        Some(crate::services::normalize::titlecase(text))
    } else {
        None
    }
}

/// Record the turn (user, and optionally the assistant reply) and write the
/// session back with its new pending state.
#[allow(clippy::too_many_arguments)]
fn finish(
    state: &Arc<AppState>,
    session_id: &str,
    mut messages: Vec<ChatMessage>,
    pending: Option<PendingAction>,
    user_text: &str,
    reply: &str,
    record_reply: bool,
    intent: &str,
    now: NaiveDateTime,
) -> TurnOutput {
    messages.push(ChatMessage::user(user_text));
    if record_reply {
        messages.push(ChatMessage::assistant(reply));
    }

    let mut sessions = state.sessions.lock().unwrap();
    let session = sessions
        .entry(session_id.to_string())
        .or_insert_with(|| ChatSession::new(session_id.to_string(), now));
    session.messages = messages;
    session.pending = pending;
    session.last_activity = now;

    TurnOutput {
        reply: reply.to_string(),
        intent: intent.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_reply_plain_words() {
        assert_eq!(name_from_reply("jane smith").as_deref(), Some("Jane Smith"));
        assert_eq!(
            name_from_reply("it's for jane smith").as_deref(),
            Some("Jane Smith")
        );
    }

    #[test]
    fn test_name_from_reply_rejects_requests() {
        assert_eq!(name_from_reply("show my appointments"), None);
        assert_eq!(name_from_reply("what about payments"), None);
        assert_eq!(name_from_reply("hello"), None);
        assert_eq!(name_from_reply("call me at 555-0199"), None);
    }
}
