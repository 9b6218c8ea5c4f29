use crate::domain::{Appointment, AppointmentUpdate, Category, NewAppointment, Patient, QueryParams};
use anyhow::Result;

/// The data-store seat. Everything the application knows about persistence
/// goes through this trait; the shipped implementation is DuckDB-backed, a
/// remote client would be another implementation.
pub trait AppointmentStore {
    /// List appointments matching the query parameters, ordered by start
    /// ascending. Empty parameters mean "everything".
    fn list(&self, params: &QueryParams) -> Result<Vec<Appointment>>;

    fn get(&self, id: &str) -> Result<Option<Appointment>>;

    /// Insert an appointment, resolving the patient by exact first/last name
    /// or creating one.
    fn insert(&self, new: NewAppointment) -> Result<Appointment>;

    fn update(&self, id: &str, update: AppointmentUpdate) -> Result<Appointment>;

    fn delete(&self, id: &str) -> Result<()>;

    /// All patients, ordered by lastname.
    fn patients(&self) -> Result<Vec<Patient>>;

    /// All categories, ordered by label.
    fn categories(&self) -> Result<Vec<Category>>;
}
