//! Maps a gated intent plus slots onto a collaborator call and a reply.
//! The match over `Intent` is exhaustive, so a new intent is a
//! compile-time-checked change. Collaborator failures become short
//! user-facing messages, never errors out of this module.

use chrono::NaiveDateTime;
use tokio::sync::broadcast;

use super::{calc, normalize};
use crate::models::{Appointment, AssistantEvent, ClientStats, Intent, IntentResult};

pub trait AppointmentStore: Send + Sync {
    fn load_appointments(&self) -> anyhow::Result<Vec<Appointment>>;
    /// Upsert keyed by normalized name + date + time.
    fn append_appointment(&self, appointment: &Appointment) -> anyhow::Result<()>;
}

pub trait AccountStore: Send + Sync {
    /// Upsert keyed by normalized name; sets the total-paid figure.
    fn update_account(&self, name: &str, total_paid: f64) -> anyhow::Result<()>;
    fn client_stats(&self) -> anyhow::Result<ClientStats>;
}

pub struct ActionCollaborators<'a> {
    pub appointments: &'a dyn AppointmentStore,
    pub accounts: &'a dyn AccountStore,
    pub events: &'a broadcast::Sender<AssistantEvent>,
}

impl ActionCollaborators<'_> {
    fn emit(&self, event: AssistantEvent) {
        // Nobody listening is fine; events are best-effort navigation hints.
        let _ = self.events.send(event);
    }
}

/// What a routed turn resolved to. Booking never commits here — it goes
/// through the confirmation state machine owned by the conversation engine.
#[derive(Debug)]
pub enum Outcome {
    /// Final reply, turn complete.
    Reply(String),
    /// Small talk; the caller hands the turn to the completion service.
    FreeChat,
    /// A booking with a name, waiting for yes/no.
    Confirm {
        appointment: Appointment,
        pretty_date: String,
        reply: String,
    },
    /// A booking without a name; date/time are kept for the follow-up.
    NeedName {
        date: String,
        time: String,
        pretty_date: String,
        reply: String,
    },
}

pub fn dispatch(
    slots: &IntentResult,
    utterance: &str,
    collab: &ActionCollaborators<'_>,
    now: NaiveDateTime,
) -> Outcome {
    match slots.intent {
        Intent::SmallTalk => Outcome::FreeChat,

        Intent::ShowAppointments => {
            let items = collab.appointments.load_appointments().unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to load appointments");
                Vec::new()
            });
            Outcome::Reply(render_appointments(&items))
        }

        Intent::BookAppointment => {
            let name = normalize::titlecase(slots.name.as_deref().unwrap_or(""));
            let nd = normalize::normalize_date(slots.date.as_deref().unwrap_or(""), utterance, now);
            let time = normalize::normalize_time(slots.time.as_deref().unwrap_or(""), utterance);

            if name.is_empty() {
                return Outcome::NeedName {
                    date: nd.date,
                    time,
                    pretty_date: nd.pretty,
                    reply: "Who is the appointment for?".to_string(),
                };
            }

            let reply = format!(
                "Would you like me to book {name} on {} at {time}? (yes/no)",
                nd.pretty
            );
            Outcome::Confirm {
                appointment: Appointment {
                    name,
                    date: nd.date,
                    time,
                },
                pretty_date: nd.pretty,
                reply,
            }
        }

        Intent::UpdatePayment => {
            let name = normalize::titlecase(slots.name.as_deref().unwrap_or(""));
            if name.is_empty() {
                return Outcome::Reply("Whose payment should I update?".to_string());
            }
            let amount = slots
                .amount
                .as_deref()
                .and_then(normalize::parse_amount);
            let Some(amount) = amount else {
                return Outcome::Reply(format!("How much did {name} pay?"));
            };

            match collab.accounts.update_account(&name, amount) {
                Ok(()) => Outcome::Reply(format!("💾 Updated payment for {name}: {amount:.2}.")),
                Err(e) => Outcome::Reply(format!("⚠️ Couldn't update payment: {e}")),
            }
        }

        Intent::CreateReport => {
            let name = match slots.name.as_deref() {
                Some(n) if !n.trim().is_empty() => normalize::titlecase(n),
                _ => "Unknown".to_string(),
            };
            let report_type = "visit".to_string();
            collab.emit(AssistantEvent::ReportRequested {
                name: name.clone(),
                report_type: report_type.clone(),
            });
            Outcome::Reply(format!("📝 Preparing a {report_type} report for {name}…"))
        }

        Intent::Calc => {
            let expression = slots
                .expression
                .clone()
                .or_else(|| calc::extract_expression(utterance));
            let Some(expression) = expression else {
                return Outcome::Reply("What should I calculate?".to_string());
            };
            let expression = expression.trim().to_string();

            match calc::evaluate(&expression) {
                Ok(value) => {
                    Outcome::Reply(format!("{expression} = {}", calc::format_result(value)))
                }
                Err(e) => {
                    tracing::debug!(error = %e, expression, "calc evaluation failed");
                    Outcome::Reply(
                        "Sorry, I couldn't evaluate that. Try something like 12.5*(3+2)."
                            .to_string(),
                    )
                }
            }
        }

        Intent::GetTime => Outcome::Reply(format!(
            "It's {} on {}.",
            now.format("%I:%M %p"),
            now.format("%A, %B %d, %Y")
        )),

        Intent::ShowClientStats => {
            let reply = match collab.accounts.client_stats() {
                Ok(stats) => render_stats(&stats),
                Err(e) => {
                    tracing::error!(error = %e, "failed to compute client stats");
                    "Opening client stats…".to_string()
                }
            };
            collab.emit(AssistantEvent::OpenClientStats);
            Outcome::Reply(reply)
        }
    }
}

/// Persist a confirmed booking and raise the booked event. Used by the
/// confirmation state machine on an affirmative reply.
pub fn commit_booking(appointment: &Appointment, collab: &ActionCollaborators<'_>) -> String {
    match collab.appointments.append_appointment(appointment) {
        Ok(()) => {
            collab.emit(AssistantEvent::AppointmentBooked {
                appointment: appointment.clone(),
            });
            format!(
                "✅ Booked {} on {} at {}.",
                appointment.name, appointment.date, appointment.time
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to save appointment");
            format!("Sorry, I couldn't save that appointment. ({e})")
        }
    }
}

fn render_appointments(items: &[Appointment]) -> String {
    if items.is_empty() {
        return "No appointments found.".to_string();
    }
    let mut lines = vec!["Here are the appointments:".to_string()];
    for appt in items {
        lines.push(format!("• {} {} — {}", appt.date, appt.time, appt.name));
    }
    lines.join("\n")
}

fn render_stats(stats: &ClientStats) -> String {
    format!(
        "Opening client stats…\n- Clients: {}\n- Total Paid: {:.2}\n- Total Amount: {:.2}\n- Total Owed: {:.2}",
        stats.clients, stats.total_paid, stats.total_amount, stats.total_owed
    )
}
