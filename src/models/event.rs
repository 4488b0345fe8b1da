use serde::Serialize;

use super::Appointment;

/// Events the dispatcher raises for the surrounding application (tab
/// navigation, list refresh). Delivered to subscribers over SSE.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AssistantEvent {
    AppointmentBooked { appointment: Appointment },
    OpenClientStats,
    ReportRequested { name: String, report_type: String },
}
