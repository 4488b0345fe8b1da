use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::queries;
use crate::models::{Appointment, ClientStats};
use crate::services::dispatch::{AccountStore, AppointmentStore};

/// SQLite-backed collaborator handed to the dispatcher.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

impl AppointmentStore for SqliteStore {
    fn load_appointments(&self) -> anyhow::Result<Vec<Appointment>> {
        let conn = self.db.lock().unwrap();
        queries::load_appointments(&conn)
    }

    fn append_appointment(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let conn = self.db.lock().unwrap();
        queries::upsert_appointment(&conn, appointment)
    }
}

impl AccountStore for SqliteStore {
    fn update_account(&self, name: &str, total_paid: f64) -> anyhow::Result<()> {
        let conn = self.db.lock().unwrap();
        queries::upsert_account(&conn, name, total_paid)
    }

    fn client_stats(&self) -> anyhow::Result<ClientStats> {
        let conn = self.db.lock().unwrap();
        queries::client_stats(&conn)
    }
}
