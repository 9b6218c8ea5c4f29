use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub color: String,
}

/// An appointment as the store returns it, with the linked patient hydrated
/// when one is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub patient: Option<Patient>,
}

impl Appointment {
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.start > now
    }

    pub fn patient_name(&self) -> Option<String> {
        self.patient.as_ref().map(Patient::full_name)
    }
}

/// Payload for creating an appointment. Carries the patient's names rather
/// than an id; the store resolves an existing patient by exact first/last
/// name or creates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub firstname: String,
    pub lastname: String,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn new(
        title: impl Into<String>,
        start: NaiveDateTime,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start,
            end: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
            category: None,
            notes: None,
        }
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Full replacement payload for an update. When both names are present the
/// linked patient is renamed in the same operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl AppointmentUpdate {
    /// Start from an existing appointment so callers can override only the
    /// fields they mean to change.
    pub fn from_existing(appointment: &Appointment) -> Self {
        Self {
            title: appointment.title.clone(),
            start: appointment.start,
            end: appointment.end,
            category: appointment.category.clone(),
            notes: appointment.notes.clone(),
            firstname: None,
            lastname: None,
        }
    }

    pub fn renames_patient(&self) -> bool {
        self.firstname.is_some() && self.lastname.is_some()
    }
}
