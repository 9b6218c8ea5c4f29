use crate::domain::{Appointment, AppointmentUpdate, Category, NewAppointment, Patient, QueryParams};
use crate::infrastructure::{AppointmentStore, ChangeAction, ChangeContext, HookRegistry};
use anyhow::Result;
use chrono::NaiveDateTime;
use log::{debug, info};

/// Category id the dashboard singles out in its summary.
pub const IMPORTANT_CATEGORY: &str = "important";

/// The appointment book: the store handle plus the most recently fetched
/// result set. All reads below (client list, summary) are derived from that
/// cached set, so they reflect whatever filter produced the last refresh.
pub struct Schedule {
    appointments: Vec<Appointment>,
    store: Box<dyn AppointmentStore>,
    hooks: HookRegistry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub active: usize,
    pub important: usize,
    pub next: Option<Appointment>,
}

impl Schedule {
    pub fn new(store: Box<dyn AppointmentStore>) -> Self {
        Self::with_hooks(store, HookRegistry::new())
    }

    pub fn with_hooks(store: Box<dyn AppointmentStore>, hooks: HookRegistry) -> Self {
        Self {
            appointments: Vec::new(),
            store,
            hooks,
        }
    }

    /// Re-fetch the result set with the given parameters.
    pub fn refresh(&mut self, params: &QueryParams) -> Result<&[Appointment]> {
        self.appointments = self.store.list(params)?;
        debug!(
            "refreshed schedule: {} appointments for {:?}",
            self.appointments.len(),
            params.as_pairs()
        );
        Ok(&self.appointments)
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, id: &str) -> Result<Option<Appointment>> {
        self.store.get(id)
    }

    pub fn create(&mut self, new: NewAppointment) -> Result<Appointment> {
        let appointment = self.store.insert(new)?;
        info!("created appointment {}", appointment.id);
        self.hooks.execute(&ChangeContext {
            action: ChangeAction::Created,
            appointment_id: appointment.id.clone(),
            title: appointment.title.clone(),
        })?;
        Ok(appointment)
    }

    pub fn update(&mut self, id: &str, update: AppointmentUpdate) -> Result<Appointment> {
        let appointment = self.store.update(id, update)?;
        info!("updated appointment {}", appointment.id);
        self.hooks.execute(&ChangeContext {
            action: ChangeAction::Updated,
            appointment_id: appointment.id.clone(),
            title: appointment.title.clone(),
        })?;
        Ok(appointment)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let title = self
            .store
            .get(id)?
            .map(|a| a.title)
            .unwrap_or_default();
        self.store.delete(id)?;
        info!("deleted appointment {}", id);
        self.hooks.execute(&ChangeContext {
            action: ChangeAction::Deleted,
            appointment_id: id.to_string(),
            title,
        })?;
        Ok(())
    }

    pub fn patients(&self) -> Result<Vec<Patient>> {
        self.store.patients()
    }

    pub fn categories(&self) -> Result<Vec<Category>> {
        self.store.categories()
    }

    /// Patients that actually occur in the current result set, deduplicated
    /// by id, in order of first appearance.
    pub fn client_list(&self) -> Vec<Patient> {
        let mut seen = std::collections::HashSet::new();
        self.appointments
            .iter()
            .filter_map(|a| a.patient.clone())
            .filter(|p| seen.insert(p.id.clone()))
            .collect()
    }

    /// Counts and the next upcoming appointment, over the current result set.
    pub fn summary(&self, now: NaiveDateTime) -> ScheduleSummary {
        let next = self
            .appointments
            .iter()
            .filter(|a| a.is_upcoming(now))
            .min_by_key(|a| a.start)
            .cloned();

        ScheduleSummary {
            active: self.appointments.len(),
            important: self
                .appointments
                .iter()
                .filter(|a| a.category.as_deref() == Some(IMPORTANT_CATEGORY))
                .count(),
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn patient(id: &str, first: &str, last: &str) -> Patient {
        Patient {
            id: id.to_string(),
            firstname: first.to_string(),
            lastname: last.to_string(),
        }
    }

    fn appointment(id: &str, start: NaiveDateTime, category: Option<&str>, p: Option<Patient>) -> Appointment {
        Appointment {
            id: id.to_string(),
            title: format!("Termin {id}"),
            start,
            end: None,
            notes: None,
            category: category.map(str::to_string),
            patient: p,
        }
    }

    /// Store stub that serves a fixed result set.
    struct FixedStore(Vec<Appointment>);

    impl AppointmentStore for FixedStore {
        fn list(&self, _params: &QueryParams) -> Result<Vec<Appointment>> {
            Ok(self.0.clone())
        }

        fn get(&self, id: &str) -> Result<Option<Appointment>> {
            Ok(self.0.iter().find(|a| a.id == id).cloned())
        }

        fn insert(&self, _new: NewAppointment) -> Result<Appointment> {
            anyhow::bail!("not used in these tests")
        }

        fn update(&self, _id: &str, _update: AppointmentUpdate) -> Result<Appointment> {
            anyhow::bail!("not used in these tests")
        }

        fn delete(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        fn patients(&self) -> Result<Vec<Patient>> {
            Ok(Vec::new())
        }

        fn categories(&self) -> Result<Vec<Category>> {
            Ok(Vec::new())
        }
    }

    fn schedule_with(appointments: Vec<Appointment>) -> Schedule {
        let mut schedule = Schedule::new(Box::new(FixedStore(appointments)));
        schedule.refresh(&QueryParams::default()).unwrap();
        schedule
    }

    #[test]
    fn client_list_deduplicates_by_id_keeping_first_appearance() {
        let anna = patient("p1", "Anna", "Schmidt");
        let ben = patient("p2", "Ben", "Keller");
        let schedule = schedule_with(vec![
            appointment("a1", at(13, 9), None, Some(anna.clone())),
            appointment("a2", at(13, 11), None, Some(ben.clone())),
            appointment("a3", at(14, 9), None, Some(anna.clone())),
            appointment("a4", at(14, 11), None, None),
        ]);

        assert_eq!(schedule.client_list(), vec![anna, ben]);
    }

    #[test]
    fn summary_counts_and_picks_the_earliest_upcoming() {
        let schedule = schedule_with(vec![
            appointment("a1", at(13, 9), Some(IMPORTANT_CATEGORY), None),
            appointment("a2", at(15, 14), None, None),
            appointment("a3", at(15, 10), None, None),
            appointment("a4", at(16, 8), Some(IMPORTANT_CATEGORY), None),
        ]);

        let summary = schedule.summary(at(15, 9));
        assert_eq!(summary.active, 4);
        assert_eq!(summary.important, 2);
        assert_eq!(summary.next.unwrap().id, "a3");
    }

    #[test]
    fn summary_with_nothing_upcoming_has_no_next() {
        let schedule = schedule_with(vec![appointment("a1", at(13, 9), None, None)]);
        assert_eq!(schedule.summary(at(20, 0)).next, None);
    }
}
