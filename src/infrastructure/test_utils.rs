/// Test utilities for DuckDB-based tests
///
/// Provides a simple harness that creates a fresh DuckDB instance per test
/// and cleans it up automatically, so store tests stay isolated without any
/// rollback logic.
#[cfg(test)]
pub mod test_harness {
    use crate::domain::{Appointment, Category, NewAppointment};
    use crate::infrastructure::{AppointmentStore, DuckDbStore};
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Fresh DuckDB store per test, removed when dropped
    pub struct TestStore {
        pub store: DuckDbStore,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    impl TestStore {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let db_path = temp_dir.path().join("test.db");

            let store = DuckDbStore::new(&db_path).expect("Failed to initialize test store");

            Self {
                store,
                _temp_dir: temp_dir,
            }
        }

        pub fn store(&self) -> &DuckDbStore {
            &self.store
        }

        /// Database path (useful for debugging)
        pub fn db_path(&self) -> PathBuf {
            self._temp_dir.path().join("test.db")
        }

        /// Convenience method to create an appointment at 09:00 on the
        /// given day for a fixed sample patient
        pub fn create_sample_appointment(&self, date: NaiveDate) -> Result<Appointment> {
            let start = sample_time(date, 9);
            self.store.insert(
                NewAppointment::new("Kontrolle", start, "Anna", "Schmidt")
                    .with_end(sample_time(date, 10))
                    .with_category("c1"),
            )
        }

        /// Seed the category reference data used across tests
        pub fn seed_categories(&self) -> Result<()> {
            for (id, label, color) in [
                ("c1", "Erstgespräch", "#a259df"),
                ("c2", "Verlaufsgespräch", "#38b6ff"),
                ("important", "Wichtig", "#f87171"),
            ] {
                self.store.insert_category(&Category {
                    id: id.to_string(),
                    label: label.to_string(),
                    color: color.to_string(),
                })?;
            }
            Ok(())
        }
    }

    fn sample_time(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).expect("valid sample time")
    }

    /// Run a test with a fresh test store
    pub fn with_test_store<F, R>(test_fn: F) -> R
    where
        F: FnOnce(&TestStore) -> R,
    {
        let test_store = TestStore::new();
        test_fn(&test_store)
    }
}

#[cfg(test)]
pub use test_harness::*;

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::domain::QueryParams;
    use crate::infrastructure::AppointmentStore;
    use chrono::NaiveDate;

    #[test]
    fn harness_creates_a_working_store() {
        let test_store = TestStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();

        assert!(test_store
            .store()
            .list(&QueryParams::default())
            .unwrap()
            .is_empty());

        let created = test_store.create_sample_appointment(date).unwrap();
        let listed = test_store.store().list(&QueryParams::default()).unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn each_harness_is_isolated() {
        let first = TestStore::new();
        let second = TestStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();

        first.create_sample_appointment(date).unwrap();

        assert!(second
            .store()
            .list(&QueryParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn harness_with_function() {
        with_test_store(|test_store| {
            test_store.seed_categories().unwrap();
            assert_eq!(test_store.store().categories().unwrap().len(), 3);
        });
    }
}
