use serde::{Deserialize, Serialize};

/// One appointment record on the wire. The key names and value formats are
/// load-bearing: `AppointmentDate` is always `dd-mm-yyyy` and
/// `AppointmentTime` is always zero-padded `hh:mm AM/PM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "AppointmentDate")]
    pub date: String,
    #[serde(rename = "AppointmentTime")]
    pub time: String,
}
