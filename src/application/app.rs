use crate::application::Config;
use crate::domain::{
    Appointment, AppointmentUpdate, DateBoundaries, DateWindow, FilterValue, NewAppointment,
    PresetMatch, QueryParams, Schedule, ViewDirective,
};
use crate::infrastructure::{ChangeLogHook, ConsoleNotifier, DuckDbStore, HookRegistry};
use anyhow::Result;
use chrono::{Local, NaiveDate};

/// Screen controller: owns the current filter value and everything derived
/// from it. A filter change replaces the value wholesale and synchronously
/// re-derives preset match, view directive, and query parameters; nothing in
/// here queues or debounces, so derived state always reflects the latest
/// value.
pub struct CalendarApp {
    pub schedule: Schedule,
    config: Config,
    filter: FilterValue,
    boundaries: DateBoundaries,
    directive: ViewDirective,
}

impl CalendarApp {
    pub fn new() -> Result<Self> {
        Self::with_default_plugins()
    }

    pub fn with_default_plugins() -> Result<Self> {
        let config = Config::from_env();
        std::fs::create_dir_all(&config.data_dir)?;

        // Set up hook registry with default plugins
        let mut hook_registry = HookRegistry::new();
        hook_registry.register(ChangeLogHook::new(&config.data_dir));
        hook_registry.register(ConsoleNotifier);

        let store = DuckDbStore::new(&config.db_path)?;
        let schedule = Schedule::with_hooks(Box::new(store), hook_registry);

        Ok(Self::with_schedule(schedule, config))
    }

    pub fn without_plugins() -> Result<Self> {
        let config = Config::from_env();
        std::fs::create_dir_all(&config.data_dir)?;

        let store = DuckDbStore::new(&config.db_path)?;
        let schedule = Schedule::new(Box::new(store));

        Ok(Self::with_schedule(schedule, config))
    }

    pub fn with_schedule(schedule: Schedule, config: Config) -> Self {
        let boundaries = DateBoundaries::now();
        let filter = FilterValue::new();
        let directive = filter.view_directive(&boundaries);

        Self {
            schedule,
            config,
            filter,
            boundaries,
            directive,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &FilterValue {
        &self.filter
    }

    pub fn boundaries(&self) -> &DateBoundaries {
        &self.boundaries
    }

    pub fn view_directive(&self) -> ViewDirective {
        self.directive
    }

    /// Which preset control should render as selected.
    pub fn preset(&self) -> PresetMatch {
        self.filter.preset(&self.boundaries)
    }

    /// Apply a new filter value against the current wall-clock date.
    pub fn apply_filter(&mut self, filter: FilterValue) -> Result<()> {
        self.apply_filter_at(filter, Local::now().date_naive())
    }

    /// Apply a new filter value: recompute the named boundaries for the
    /// reference date, re-derive the view directive, project query
    /// parameters, and re-fetch.
    pub fn apply_filter_at(&mut self, filter: FilterValue, reference: NaiveDate) -> Result<()> {
        self.boundaries = DateBoundaries::at(reference);
        self.directive = filter.view_directive(&self.boundaries);
        self.filter = filter;

        let params = QueryParams::from_filter(&self.filter);
        self.schedule.refresh(&params)?;
        Ok(())
    }

    /// Re-fetch with the current filter unchanged.
    pub fn refresh(&mut self) -> Result<()> {
        let params = QueryParams::from_filter(&self.filter);
        self.schedule.refresh(&params)?;
        Ok(())
    }

    pub fn select_today(&mut self) -> Result<()> {
        self.select_window(DateBoundaries::now().today)
    }

    pub fn select_this_week(&mut self) -> Result<()> {
        self.select_window(DateBoundaries::now().this_week)
    }

    pub fn select_this_month(&mut self) -> Result<()> {
        self.select_window(DateBoundaries::now().this_month)
    }

    /// Drop the date restriction ("Alles").
    pub fn select_everything(&mut self) -> Result<()> {
        self.select_window(DateWindow::unbounded())
    }

    fn select_window(&mut self, window: DateWindow) -> Result<()> {
        let filter = self.filter.clone().with_window(window.start, window.end)?;
        self.apply_filter(filter)
    }

    pub fn create(&mut self, new: NewAppointment) -> Result<Appointment> {
        let appointment = self.schedule.create(new)?;
        self.refresh()?;
        Ok(appointment)
    }

    pub fn update(&mut self, id: &str, update: AppointmentUpdate) -> Result<Appointment> {
        let appointment = self.schedule.update(id, update)?;
        self.refresh()?;
        Ok(appointment)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.schedule.delete(id)?;
        self.refresh()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ViewMode;
    use chrono::NaiveDate;

    fn app_with_memory_store() -> CalendarApp {
        let store = DuckDbStore::in_memory().unwrap();
        let schedule = Schedule::new(Box::new(store));
        CalendarApp::with_schedule(schedule, Config::from_env())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn applying_the_week_preset_reconciles_and_refetches() {
        let mut app = app_with_memory_store();

        let inside = NewAppointment::new(
            "Erstgespräch",
            date(15).and_hms_opt(9, 0, 0).unwrap(),
            "Anna",
            "Schmidt",
        )
        .with_end(date(15).and_hms_opt(10, 0, 0).unwrap());
        let outside = NewAppointment::new(
            "Nachsorge",
            date(27).and_hms_opt(9, 0, 0).unwrap(),
            "Ben",
            "Keller",
        )
        .with_end(date(27).and_hms_opt(10, 0, 0).unwrap());
        app.create(inside).unwrap();
        app.create(outside).unwrap();

        let filter = FilterValue::new()
            .with_window(Some(date(13)), Some(date(17)))
            .unwrap();
        app.apply_filter_at(filter, date(15)).unwrap();

        assert_eq!(app.preset(), PresetMatch::ThisWeek);
        let directive = app.view_directive();
        assert_eq!(directive.view_mode, ViewMode::Week);
        assert_eq!(directive.anchor, Some(date(13)));

        let titles: Vec<&str> = app
            .schedule
            .appointments()
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Erstgespräch"]);
    }

    #[test]
    fn clearing_the_filter_fetches_everything_again() {
        let mut app = app_with_memory_store();

        app.create(NewAppointment::new(
            "Kontrolle",
            date(2).and_hms_opt(9, 0, 0).unwrap(),
            "Anna",
            "Schmidt",
        ))
        .unwrap();

        let narrow = FilterValue::new()
            .with_window(Some(date(20)), Some(date(21)))
            .unwrap();
        app.apply_filter_at(narrow, date(15)).unwrap();
        assert!(app.schedule.appointments().is_empty());
        assert_eq!(app.preset(), PresetMatch::Custom);

        let cleared = app.filter().clone().reset();
        app.apply_filter_at(cleared, date(15)).unwrap();
        assert_eq!(app.preset(), PresetMatch::Unbounded);
        assert_eq!(app.schedule.appointments().len(), 1);
    }

    #[test]
    fn mutations_refresh_the_current_result_set() {
        let mut app = app_with_memory_store();

        let created = app
            .create(NewAppointment::new(
                "Kontrolle",
                date(15).and_hms_opt(9, 0, 0).unwrap(),
                "Anna",
                "Schmidt",
            ))
            .unwrap();
        assert_eq!(app.schedule.appointments().len(), 1);

        app.delete(&created.id).unwrap();
        assert!(app.schedule.appointments().is_empty());
    }
}
