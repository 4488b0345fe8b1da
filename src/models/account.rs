use serde::{Deserialize, Serialize};

/// A client billing account. Upserts are keyed by the lowercased name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "TotalPaid")]
    pub total_paid: f64,
    #[serde(rename = "TotalAmount")]
    pub total_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientStats {
    pub clients: i64,
    pub total_paid: f64,
    pub total_amount: f64,
    pub total_owed: f64,
}
