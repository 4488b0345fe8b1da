use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::{Account, Appointment, ClientStats};

// ── Appointments ──

pub fn load_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    // Dates are stored in the wire format dd-mm-yyyy; order by the
    // rearranged yyyymmdd key so the list reads chronologically.
    let mut stmt = conn.prepare(
        "SELECT name, date, time FROM appointments
         ORDER BY substr(date, 7, 4) || substr(date, 4, 2) || substr(date, 1, 2), created_at",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Appointment {
            name: row.get(0)?,
            date: row.get(1)?,
            time: row.get(2)?,
        })
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?);
    }
    Ok(appointments)
}

pub fn upsert_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    let created_at = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments (id, name, date, time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name, date, time) DO NOTHING",
        params![
            Uuid::new_v4().to_string(),
            appointment.name,
            appointment.date,
            appointment.time,
            created_at,
        ],
    )?;
    Ok(())
}

// ── Accounts ──

pub fn load_accounts(conn: &Connection) -> anyhow::Result<Vec<Account>> {
    let mut stmt =
        conn.prepare("SELECT name, total_paid, total_amount FROM accounts ORDER BY name")?;

    let rows = stmt.query_map([], |row| {
        Ok(Account {
            name: row.get(0)?,
            total_paid: row.get(1)?,
            total_amount: row.get(2)?,
        })
    })?;

    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row?);
    }
    Ok(accounts)
}

pub fn upsert_account(conn: &Connection, name: &str, total_paid: f64) -> anyhow::Result<()> {
    let updated_at = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO accounts (name_key, name, total_paid, total_amount, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4)
         ON CONFLICT(name_key) DO UPDATE SET
           name = excluded.name,
           total_paid = excluded.total_paid,
           updated_at = excluded.updated_at",
        params![name.to_lowercase(), name, total_paid, updated_at],
    )?;
    Ok(())
}

pub fn client_stats(conn: &Connection) -> anyhow::Result<ClientStats> {
    let (clients, total_paid, total_amount): (i64, f64, f64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(total_paid), 0), COALESCE(SUM(total_amount), 0)
         FROM accounts",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    Ok(ClientStats {
        clients,
        total_paid,
        total_amount,
        total_owed: total_amount - total_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn appt(name: &str, date: &str, time: &str) -> Appointment {
        Appointment {
            name: name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_appointment_upsert_is_idempotent() {
        let conn = setup_db();
        let a = appt("Jane Smith", "07-08-2026", "10:30 AM");
        upsert_appointment(&conn, &a).unwrap();
        upsert_appointment(&conn, &a).unwrap();
        assert_eq!(load_appointments(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_appointments_ordered_by_date() {
        let conn = setup_db();
        upsert_appointment(&conn, &appt("Late", "01-09-2026", "09:00 AM")).unwrap();
        upsert_appointment(&conn, &appt("Early", "07-08-2026", "10:30 AM")).unwrap();
        let list = load_appointments(&conn).unwrap();
        assert_eq!(list[0].name, "Early");
        assert_eq!(list[1].name, "Late");
    }

    #[test]
    fn test_account_upsert_keyed_by_lowercased_name() {
        let conn = setup_db();
        upsert_account(&conn, "John Doe", 100.0).unwrap();
        upsert_account(&conn, "JOHN DOE", 250.0).unwrap();
        let accounts = load_accounts(&conn).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].total_paid, 250.0);
    }

    #[test]
    fn test_client_stats_totals() {
        let conn = setup_db();
        upsert_account(&conn, "A", 100.0).unwrap();
        upsert_account(&conn, "B", 50.0).unwrap();
        let stats = client_stats(&conn).unwrap();
        assert_eq!(stats.clients, 2);
        assert_eq!(stats.total_paid, 150.0);
        assert_eq!(stats.total_owed, -150.0);
    }
}
