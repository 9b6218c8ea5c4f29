use crate::application::{CalendarApp, CalendarView, CalendarViewResult};
use crate::domain::{AppointmentUpdate, DateWindow, FilterValue, NewAppointment, PresetMatch};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::io::Write;

#[derive(Parser)]
#[command(name = "praxiskalender")]
#[command(about = "A scheduling calendar for a small practice")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an appointment
    Add {
        /// Appointment title
        title: String,
        /// Start (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        start: String,
        /// End (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        end: Option<String>,
        /// Patient first name
        #[arg(long)]
        firstname: String,
        /// Patient last name
        #[arg(long)]
        lastname: String,
        /// Category id
        #[arg(short, long)]
        category: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List appointments matching a filter
    List {
        /// Only today
        #[arg(long)]
        today: bool,
        /// Only the current work week (Monday through Friday)
        #[arg(long)]
        week: bool,
        /// Only the current month
        #[arg(long)]
        month: bool,
        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Category id (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
        /// Patient id
        #[arg(long)]
        client: Option<String>,
    },
    /// Edit an appointment; omitted fields keep their current value
    Edit {
        /// Appointment id
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Start (YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// End (YYYY-MM-DD HH:MM)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Rename the patient (requires --lastname too)
        #[arg(long)]
        firstname: Option<String>,
        #[arg(long)]
        lastname: Option<String>,
    },
    /// Delete an appointment
    Delete {
        /// Appointment id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List patients on file
    Patients,
    /// List categories on file
    Categories,
    /// Open the interactive calendar view
    Calendar {
        /// Date to focus on (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

impl Cli {
    pub fn run() -> Result<()> {
        let cli = Self::parse();
        let mut app = CalendarApp::new()?;

        match cli.command {
            Some(Commands::Add {
                title,
                start,
                end,
                firstname,
                lastname,
                category,
                notes,
            }) => {
                let mut new = NewAppointment::new(title, parse_datetime(&start)?, firstname, lastname);
                if let Some(end) = end {
                    new = new.with_end(parse_datetime(&end)?);
                }
                if let Some(category) = category {
                    new = new.with_category(category);
                }
                if let Some(notes) = notes {
                    new = new.with_notes(notes);
                }

                let created = app.create(new)?;
                println!("{}  {}", created.id, created.title);
            }
            Some(Commands::List {
                today,
                week,
                month,
                from,
                to,
                category,
                client,
            }) => {
                let window = if today {
                    app.boundaries().today
                } else if week {
                    app.boundaries().this_week
                } else if month {
                    app.boundaries().this_month
                } else {
                    DateWindow {
                        start: from.as_deref().map(parse_date).transpose()?,
                        end: to.as_deref().map(parse_date).transpose()?,
                    }
                };

                let filter = FilterValue::new()
                    .with_categories(category)
                    .with_client(client)
                    .with_window(window.start, window.end)?;
                app.apply_filter(filter)?;

                print_listing(&app);
            }
            Some(Commands::Edit {
                id,
                title,
                start,
                end,
                category,
                notes,
                firstname,
                lastname,
            }) => {
                let Some(existing) = app.schedule.get(&id)? else {
                    bail!("no appointment with id {id}");
                };

                let mut update = AppointmentUpdate::from_existing(&existing);
                if let Some(title) = title {
                    update.title = title;
                }
                if let Some(start) = start {
                    update.start = parse_datetime(&start)?;
                }
                if let Some(end) = end {
                    update.end = Some(parse_datetime(&end)?);
                }
                if let Some(category) = category {
                    update.category = Some(category);
                }
                if let Some(notes) = notes {
                    update.notes = Some(notes);
                }
                update.firstname = firstname;
                update.lastname = lastname;

                let updated = app.update(&id, update)?;
                println!("{}  {}", updated.id, updated.title);
            }
            Some(Commands::Delete { id, yes }) => {
                if !yes && !confirm_delete()? {
                    println!("Abgebrochen.");
                    return Ok(());
                }
                app.delete(&id)?;
            }
            Some(Commands::Patients) => {
                for patient in app.schedule.patients()? {
                    println!("{}  {}, {}", patient.id, patient.lastname, patient.firstname);
                }
            }
            Some(Commands::Categories) => {
                for category in app.schedule.categories()? {
                    println!("{}  {}  {}", category.id, category.label, category.color);
                }
            }
            Some(Commands::Calendar { date }) => {
                let target_date = if let Some(date_str) = date {
                    parse_date(&date_str)?
                } else {
                    Local::now().naive_local().date()
                };

                run_calendar(&mut app, target_date)?;
            }
            None => {
                // Default: open the calendar view on today
                let target_date = Local::now().naive_local().date();
                run_calendar(&mut app, target_date)?;
            }
        }

        Ok(())
    }
}

fn run_calendar(app: &mut CalendarApp, target_date: NaiveDate) -> Result<()> {
    app.refresh()?;
    let mut view = CalendarView::new(app, target_date)?;
    let CalendarViewResult::Exited(_) = view.run()?;
    Ok(())
}

fn print_listing(app: &CalendarApp) {
    let appointments = app.schedule.appointments();
    match app.preset() {
        PresetMatch::Today => println!("Heute:"),
        PresetMatch::ThisWeek => println!("Diese Woche:"),
        PresetMatch::ThisMonth => println!("Diesen Monat:"),
        PresetMatch::Custom | PresetMatch::Unbounded => {}
    }

    for appointment in appointments {
        let patient = appointment.patient_name().unwrap_or_default();
        let category = appointment.category.as_deref().unwrap_or("-");
        println!(
            "{}  {}  {:<30} {:<25} [{}]",
            appointment.id,
            appointment.start.format("%Y-%m-%d %H:%M"),
            appointment.title,
            patient,
            category
        );
    }
    println!("{} appointment(s)", appointments.len());
}

fn confirm_delete() -> Result<bool> {
    print!("Möchten Sie das wirklich löschen? [j/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;

    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "j" | "ja" | "y" | "yes"
    ))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date: {raw} (expected YYYY-MM-DD)"))
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }

    // a bare date means midnight
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    bail!("invalid date-time: {raw} (expected YYYY-MM-DD HH:MM)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_parsing_accepts_common_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        assert_eq!(parse_datetime("2024-05-15 09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-05-15T09:30").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-05-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(parse_datetime("15.05.2024").is_err());
    }
}
