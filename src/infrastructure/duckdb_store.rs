use crate::domain::{Appointment, AppointmentUpdate, Category, NewAppointment, Patient, QueryParams};
use crate::infrastructure::AppointmentStore;
use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use duckdb::{Connection, OptionalExt, params, params_from_iter};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_APPOINTMENT: &str = "SELECT a.id, a.title, a.start_at, a.end_at, a.notes, a.category, \
     p.id, p.firstname, p.lastname \
     FROM appointments a LEFT JOIN patients p ON a.patient = p.id";

/// DuckDB-backed implementation of the store seat. Query shaping mirrors how
/// the listing endpoint narrows its result set: equality on category,
/// `start >=`, `end <=`, equality on patient, ordered by start.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open DuckDB connection")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory DuckDB connection")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                firstname TEXT NOT NULL,
                lastname TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                color TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT,
                notes TEXT,
                category TEXT,
                patient TEXT
            );
        "#,
        )
        .context("Failed to create schema")?;
        Ok(())
    }

    /// Categories are reference data the listing endpoints only read; this
    /// seeds or replaces one.
    pub fn insert_category(&self, category: &Category) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO categories (id, label, color) VALUES (?, ?, ?)",
            params![category.id, category.label, category.color],
        )
        .context("Failed to insert category")?;
        Ok(())
    }

    /// Look the patient up by exact first/last name, creating one if absent.
    fn resolve_patient(&self, conn: &Connection, firstname: &str, lastname: &str) -> Result<String> {
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM patients WHERE firstname = ? AND lastname = ?",
                params![firstname, lastname],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up patient")?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO patients (id, firstname, lastname) VALUES (?, ?, ?)",
            params![id, firstname, lastname],
        )
        .context("Failed to insert patient")?;
        Ok(id)
    }
}

type RawAppointmentRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn read_appointment_row(row: &duckdb::Row<'_>) -> duckdb::Result<RawAppointmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn appointment_from_row(raw: RawAppointmentRow) -> Result<Appointment> {
    let (id, title, start_raw, end_raw, notes, category, patient_id, firstname, lastname) = raw;

    let patient = match (patient_id, firstname, lastname) {
        (Some(id), Some(firstname), Some(lastname)) => Some(Patient {
            id,
            firstname,
            lastname,
        }),
        _ => None,
    };

    Ok(Appointment {
        id,
        title,
        start: parse_datetime(&start_raw)?,
        end: end_raw.as_deref().map(parse_datetime).transpose()?,
        notes,
        category,
        patient,
    })
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .with_context(|| format!("Failed to parse datetime from store: {raw}"))
}

impl AppointmentStore for DuckDbStore {
    fn list(&self, query_params: &QueryParams) -> Result<Vec<Appointment>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(SELECT_APPOINTMENT);
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(categories) = &query_params.category {
            if !categories.is_empty() {
                let placeholders = vec!["?"; categories.len()].join(", ");
                clauses.push(format!("a.category IN ({placeholders})"));
                args.extend(categories.iter().cloned());
            }
        }
        if let Some(start) = query_params.start {
            clauses.push("a.start_at >= ?".to_string());
            args.push(format!("{} 00:00:00", start.format("%Y-%m-%d")));
        }
        if let Some(end) = query_params.end {
            clauses.push("a.end_at <= ?".to_string());
            args.push(format!("{} 23:59:59", end.format("%Y-%m-%d")));
        }
        if let Some(client) = &query_params.client {
            clauses.push("a.patient = ?".to_string());
            args.push(client.clone());
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY a.start_at");

        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare appointment listing")?;
        let rows = stmt.query_map(params_from_iter(args.iter()), read_appointment_row)?;

        let mut appointments = Vec::new();
        for raw in rows {
            appointments.push(appointment_from_row(raw?)?);
        }

        Ok(appointments)
    }

    fn get(&self, id: &str) -> Result<Option<Appointment>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("{SELECT_APPOINTMENT} WHERE a.id = ?");

        let raw = conn
            .query_row(&sql, params![id], read_appointment_row)
            .optional()
            .context("Failed to load appointment")?;

        raw.map(appointment_from_row).transpose()
    }

    fn insert(&self, new: NewAppointment) -> Result<Appointment> {
        let id = {
            let conn = self.conn.lock().unwrap();
            let patient_id = self.resolve_patient(&conn, &new.firstname, &new.lastname)?;

            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO appointments (id, title, start_at, end_at, notes, category, patient) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    id,
                    new.title,
                    format_datetime(new.start),
                    new.end.map(format_datetime),
                    new.notes,
                    new.category,
                    patient_id
                ],
            )
            .context("Failed to insert appointment")?;
            id
        };

        self.get(&id)?
            .with_context(|| format!("Inserted appointment {id} not found"))
    }

    fn update(&self, id: &str, update: AppointmentUpdate) -> Result<Appointment> {
        {
            let conn = self.conn.lock().unwrap();
            let changed = conn
                .execute(
                    "UPDATE appointments SET title = ?, start_at = ?, end_at = ?, category = ?, notes = ? \
                     WHERE id = ?",
                    params![
                        update.title,
                        format_datetime(update.start),
                        update.end.map(format_datetime),
                        update.category,
                        update.notes,
                        id
                    ],
                )
                .context("Failed to update appointment")?;
            if changed == 0 {
                bail!("no appointment with id {id}");
            }

            if update.renames_patient() {
                let patient_id: Option<String> = conn.query_row(
                    "SELECT patient FROM appointments WHERE id = ?",
                    params![id],
                    |row| row.get(0),
                )?;

                if let (Some(patient_id), Some(firstname), Some(lastname)) =
                    (patient_id, &update.firstname, &update.lastname)
                {
                    conn.execute(
                        "UPDATE patients SET firstname = ?, lastname = ? WHERE id = ?",
                        params![firstname, lastname, patient_id],
                    )
                    .context("Failed to update patient")?;
                }
            }
        }

        self.get(id)?
            .with_context(|| format!("Updated appointment {id} not found"))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute("DELETE FROM appointments WHERE id = ?", params![id])
            .context("Failed to delete appointment")?;
        if changed == 0 {
            bail!("no appointment with id {id}");
        }
        Ok(())
    }

    fn patients(&self) -> Result<Vec<Patient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, firstname, lastname FROM patients ORDER BY lastname")
            .context("Failed to prepare patient listing")?;

        let rows = stmt.query_map([], |row| {
            Ok(Patient {
                id: row.get(0)?,
                firstname: row.get(1)?,
                lastname: row.get(2)?,
            })
        })?;

        let mut patients = Vec::new();
        for patient in rows {
            patients.push(patient?);
        }
        Ok(patients)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, label, color FROM categories ORDER BY label")
            .context("Failed to prepare category listing")?;

        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                label: row.get(1)?,
                color: row.get(2)?,
            })
        })?;

        let mut categories = Vec::new();
        for category in rows {
            categories.push(category?);
        }
        Ok(categories)
    }
}
