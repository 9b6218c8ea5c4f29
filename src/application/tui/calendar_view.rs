use super::theme::Theme;
use crate::application::CalendarApp;
use crate::domain::{Appointment, Category, PresetMatch, ScheduleSummary, ViewMode, month_of};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, poll};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::collections::HashMap;
use std::io::{self, Stdout, stdout};

#[derive(Debug, Clone)]
pub enum CalendarViewResult {
    /// User left the view (quit, escape, ctrl+c, etc.)
    Exited(NaiveDate),
}

/// Appointment markers for a single calendar day
#[derive(Debug, Clone, Copy, Default)]
struct DayInfo {
    count: usize,
    important: bool,
}

/// Interactive calendar. The displayed granularity follows the view
/// directive the filter layer derives; this view never decides day/week/month
/// on its own, it only navigates within the granularity it was handed.
pub struct CalendarView<'a> {
    app: &'a mut CalendarApp,
    /// Currently selected date
    selected_date: NaiveDate,
    /// Category cycle state for the `c` key (None = no category filter)
    categories: Vec<Category>,
    category_index: Option<usize>,
    /// Terminal instance
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_exit: bool,
    show_help: bool,
    theme: Theme,
}

impl<'a> CalendarView<'a> {
    pub fn new(app: &'a mut CalendarApp, initial_date: NaiveDate) -> io::Result<Self> {
        // First check if we're in a proper terminal
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }

        enable_raw_mode().map_err(|e| {
            io::Error::other(format!("Failed to enable raw mode: {}", e))
        })?;

        stdout().execute(EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode(); // Clean up on failure
            io::Error::other(format!("Failed to enter alternate screen: {}", e))
        })?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::other(format!("Failed to create terminal: {}", e))
        })?;

        let theme = Theme::from_name(&app.config().theme);
        let categories = app.schedule.categories().unwrap_or_default();

        Ok(Self {
            app,
            selected_date: initial_date,
            categories,
            category_index: None,
            terminal,
            should_exit: false,
            show_help: false,
            theme,
        })
    }

    /// Run the calendar view loop
    pub fn run(&mut self) -> io::Result<CalendarViewResult> {
        loop {
            if self.should_exit {
                break;
            }

            // Capture the state we need for drawing before borrowing the
            // terminal mutably
            let directive = self.app.view_directive();
            let preset = self.app.preset();
            let selected_date = self.selected_date;
            let today = Local::now().date_naive();
            let day_info = Self::collect_day_info(self.app.schedule.appointments());
            let summary = self.app.schedule.summary(Local::now().naive_local());
            let day_lines = Self::day_lines(self.app.schedule.appointments(), selected_date);
            let category_label = self.category_label();
            let show_help = self.show_help;
            let theme = self.theme.clone();

            self.terminal.draw(|frame| {
                let size = frame.area();

                const STATUS_HEIGHT: u16 = 2;
                const CALENDAR_HEIGHT: u16 = 16;
                const SUMMARY_HEIGHT: u16 = 5;
                const DAY_LIST_HEIGHT: u16 = 8;
                const HELP_HEIGHT: u16 = 2;

                const MIN_WIDTH: u16 = 64;
                const PREFERRED_WIDTH: u16 = 86;

                let needed_width = if size.width >= PREFERRED_WIDTH + 4 {
                    PREFERRED_WIDTH
                } else {
                    std::cmp::min(size.width, MIN_WIDTH)
                };

                let total_height = if show_help {
                    STATUS_HEIGHT + CALENDAR_HEIGHT + SUMMARY_HEIGHT + DAY_LIST_HEIGHT + HELP_HEIGHT
                } else {
                    STATUS_HEIGHT + CALENDAR_HEIGHT + SUMMARY_HEIGHT + DAY_LIST_HEIGHT
                };

                let background =
                    Block::default().style(Style::default().bg(theme.colors.background));
                frame.render_widget(background, size);

                let area = Self::calculate_centered_area(size, needed_width, total_height);

                let mut constraints = vec![
                    Constraint::Length(STATUS_HEIGHT),
                    Constraint::Length(CALENDAR_HEIGHT),
                    Constraint::Length(SUMMARY_HEIGHT),
                    Constraint::Length(DAY_LIST_HEIGHT),
                ];
                if show_help {
                    constraints.push(Constraint::Length(HELP_HEIGHT));
                }

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints(constraints)
                    .split(area);

                let status =
                    Self::create_status_line(preset, directive.view_mode, &category_label, &theme);
                frame.render_widget(status, chunks[0]);

                match directive.view_mode {
                    ViewMode::Month => {
                        let table = Self::create_month_table(
                            selected_date,
                            today,
                            &theme,
                            &day_info,
                        );
                        frame.render_widget(table, chunks[1]);
                    }
                    ViewMode::Week => {
                        let table = Self::create_week_table(
                            selected_date,
                            today,
                            &theme,
                            &day_info,
                        );
                        frame.render_widget(table, chunks[1]);
                    }
                    ViewMode::Day => {
                        let day = Self::create_day_panel(selected_date, &day_lines, &theme);
                        frame.render_widget(day, chunks[1]);
                    }
                }

                let summary_panel = Self::create_summary(&summary, &theme);
                frame.render_widget(summary_panel, chunks[2]);

                if directive.view_mode != ViewMode::Day {
                    let day_panel = Self::create_day_panel(selected_date, &day_lines, &theme);
                    frame.render_widget(day_panel, chunks[3]);
                }

                if show_help {
                    let help = Self::create_help_text(selected_date, &theme);
                    frame.render_widget(help, chunks[4]);
                }
            })?;

            // Handle events with timeout to prevent blocking indefinitely
            match poll(std::time::Duration::from_millis(100))? {
                true => match event::read()? {
                    Event::Key(key) => {
                        self.handle_key_event(key);
                    }
                    Event::Resize(_, _) => {
                        continue;
                    }
                    _ => {
                        continue;
                    }
                },
                false => {
                    continue;
                }
            }
        }

        self.cleanup()?;

        Ok(CalendarViewResult::Exited(self.selected_date))
    }

    /// Handle keyboard input
    fn handle_key_event(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            // Exit
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.should_exit = true;
            }

            // Ctrl+C and Ctrl+D
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                self.should_exit = true;
            }

            // Navigation
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => {
                self.selected_date -= Duration::days(1);
            }
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
                self.selected_date += Duration::days(1);
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.selected_date -= Duration::weeks(1);
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                self.selected_date += Duration::weeks(1);
            }
            (KeyCode::PageUp, _) => {
                self.selected_date -= Duration::days(30);
            }
            (KeyCode::PageDown, _) => {
                self.selected_date += Duration::days(30);
            }

            // Presets
            (KeyCode::Char('t'), _) => {
                let result = self.app.select_today();
                self.after_filter_change(result);
            }
            (KeyCode::Char('w'), _) => {
                let result = self.app.select_this_week();
                self.after_filter_change(result);
            }
            (KeyCode::Char('m'), _) => {
                let result = self.app.select_this_month();
                self.after_filter_change(result);
            }
            (KeyCode::Char('a'), _) => {
                let result = self.app.select_everything();
                self.after_filter_change(result);
            }

            // Cycle the category filter
            (KeyCode::Char('c'), _) => {
                self.cycle_category();
            }

            // Toggle theme
            (KeyCode::Char('d'), _) => {
                self.theme = self.theme.toggled();
            }

            // Refetch
            (KeyCode::Char('r'), _) => {
                if let Err(e) = self.app.refresh() {
                    log::warn!("refresh failed: {e}");
                }
            }

            // Toggle help
            (KeyCode::Char('?'), _) => {
                self.show_help = !self.show_help;
            }

            _ => {}
        }
    }

    /// A filter change may carry a new anchor; follow it when it does.
    fn after_filter_change(&mut self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => {
                if let Some(anchor) = self.app.view_directive().anchor {
                    self.selected_date = anchor;
                }
            }
            Err(e) => log::warn!("filter update failed: {e}"),
        }
    }

    fn cycle_category(&mut self) {
        if self.categories.is_empty() {
            return;
        }

        self.category_index = match self.category_index {
            None => Some(0),
            Some(i) if i + 1 < self.categories.len() => Some(i + 1),
            Some(_) => None,
        };

        let filter = match self.category_index {
            Some(i) => self
                .app
                .filter()
                .clone()
                .with_categories([self.categories[i].id.clone()]),
            None => self.app.filter().clone().with_categories(Vec::<String>::new()),
        };

        if let Err(e) = self.app.apply_filter(filter) {
            log::warn!("filter update failed: {e}");
        }
    }

    fn category_label(&self) -> String {
        match self.category_index {
            Some(i) => self.categories[i].label.clone(),
            None => "alle".to_string(),
        }
    }

    fn collect_day_info(appointments: &[Appointment]) -> HashMap<NaiveDate, DayInfo> {
        let mut info: HashMap<NaiveDate, DayInfo> = HashMap::new();
        for appointment in appointments {
            let entry = info.entry(appointment.start.date()).or_default();
            entry.count += 1;
            if appointment.category.as_deref() == Some(crate::domain::IMPORTANT_CATEGORY) {
                entry.important = true;
            }
        }
        info
    }

    fn day_lines(appointments: &[Appointment], date: NaiveDate) -> Vec<String> {
        appointments
            .iter()
            .filter(|a| a.start.date() == date)
            .map(|a| {
                let end = a
                    .end
                    .map(|e| format!(" – {}", e.format("%H:%M")))
                    .unwrap_or_default();
                let patient = a
                    .patient_name()
                    .map(|p| format!(" ({p})"))
                    .unwrap_or_default();
                format!("{}{}  {}{}", a.start.format("%H:%M"), end, a.title, patient)
            })
            .collect()
    }

    /// Calculate centered area with both horizontal and vertical centering
    fn calculate_centered_area(available: Rect, needed_width: u16, needed_height: u16) -> Rect {
        let width = std::cmp::min(available.width, needed_width);
        let height = std::cmp::min(available.height, needed_height);

        let left_margin = if available.width > width {
            (available.width - width) / 2
        } else {
            0
        };

        let top_margin = if available.height > height {
            (available.height - height) / 2
        } else {
            0
        };

        Rect {
            x: available.x + left_margin,
            y: available.y + top_margin,
            width,
            height,
        }
    }

    fn create_status_line(
        preset: PresetMatch,
        view_mode: ViewMode,
        category_label: &str,
        theme: &Theme,
    ) -> Paragraph<'static> {
        let preset_label = match preset {
            PresetMatch::Today => "Heute",
            PresetMatch::ThisWeek => "Diese Woche",
            PresetMatch::ThisMonth => "Diesen Monat",
            PresetMatch::Custom => "Benutzerdefiniert",
            PresetMatch::Unbounded => "Alles",
        };
        let view_label = match view_mode {
            ViewMode::Day => "Tag",
            ViewMode::Week => "Woche",
            ViewMode::Month => "Monat",
        };

        let line = Line::from(vec![
            Span::styled(
                format!("Zeitraum: {preset_label}"),
                Style::default()
                    .fg(theme.colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  Ansicht: {view_label}  Kategorie: {category_label}"),
                Style::default().fg(theme.colors.dimmed),
            ),
        ]);

        Paragraph::new(vec![line])
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Center)
    }

    /// Style for a date cell, based on selection, today, weekend, and
    /// whether the date falls outside the focused month
    fn date_style(
        date: NaiveDate,
        in_focus_month: bool,
        selected_date: NaiveDate,
        today: NaiveDate,
        theme: &Theme,
    ) -> Style {
        if date == selected_date {
            Style::default()
                .fg(theme.colors.normal_text)
                .bg(theme.colors.selected_bg)
        } else if date == today {
            Style::default()
                .fg(theme.colors.today)
                .add_modifier(Modifier::BOLD)
        } else if !in_focus_month {
            Style::default().fg(theme.colors.dimmed)
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            Style::default().fg(theme.colors.weekend)
        } else {
            Style::default().fg(theme.colors.normal_text)
        }
    }

    fn day_cell(
        date: NaiveDate,
        in_focus_month: bool,
        selected_date: NaiveDate,
        today: NaiveDate,
        theme: &Theme,
        day_info: &HashMap<NaiveDate, DayInfo>,
    ) -> Cell<'static> {
        let info = day_info.get(&date).copied().unwrap_or_default();

        // Appointment marker; important days get a stronger one
        let marker = if info.important {
            "!"
        } else if info.count > 0 {
            "•"
        } else {
            " "
        };

        let style = Self::date_style(date, in_focus_month, selected_date, today, theme);
        Cell::from(format!("{:>2}{}", date.day(), marker)).style(style)
    }

    fn create_month_table(
        selected_date: NaiveDate,
        today: NaiveDate,
        theme: &Theme,
        day_info: &HashMap<NaiveDate, DayInfo>,
    ) -> Table<'static> {
        let (first, last) = month_of(selected_date)
            .bounds()
            .expect("month window is always closed");

        let mut week_starts = Vec::new();
        let mut monday = first - Duration::days(first.weekday().num_days_from_monday() as i64);
        while monday <= last {
            week_starts.push(monday);
            monday += Duration::days(7);
        }

        let header = Row::new(
            ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"]
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    let color = if i >= 5 {
                        theme.colors.weekend
                    } else {
                        theme.colors.header
                    };
                    Cell::from(name).style(Style::default().fg(color))
                })
                .collect::<Vec<_>>(),
        )
        .height(1);

        let rows: Vec<Row> = week_starts
            .iter()
            .map(|&week_start| {
                let cells: Vec<Cell> = (0..7)
                    .map(|offset| {
                        let date = week_start + Duration::days(offset);
                        Self::day_cell(
                            date,
                            date.month() == selected_date.month(),
                            selected_date,
                            today,
                            theme,
                            day_info,
                        )
                    })
                    .collect();
                Row::new(cells).height(2)
            })
            .collect();

        Table::new(rows, [Constraint::Percentage(14); 7])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::NONE)
                    .title(format!(
                        "{} {}",
                        german_month(selected_date.month()),
                        selected_date.year()
                    ))
                    .title_style(Style::default().fg(theme.colors.header))
                    .title_alignment(Alignment::Center),
            )
            .column_spacing(1)
    }

    /// Work-week strip: Monday through Friday of the selected date's week
    fn create_week_table(
        selected_date: NaiveDate,
        today: NaiveDate,
        theme: &Theme,
        day_info: &HashMap<NaiveDate, DayInfo>,
    ) -> Table<'static> {
        let monday =
            selected_date - Duration::days(selected_date.weekday().num_days_from_monday() as i64);

        let header = Row::new(
            ["Mo", "Di", "Mi", "Do", "Fr"]
                .into_iter()
                .map(|name| Cell::from(name).style(Style::default().fg(theme.colors.header)))
                .collect::<Vec<_>>(),
        )
        .height(1);

        let cells: Vec<Cell> = (0..5)
            .map(|offset| {
                let date = monday + Duration::days(offset);
                let info = day_info.get(&date).copied().unwrap_or_default();
                let style = Self::date_style(date, true, selected_date, today, theme);
                Cell::from(format!(
                    "{:>2}.{:02}. ({})",
                    date.day(),
                    date.month(),
                    info.count
                ))
                .style(style)
            })
            .collect();

        let rows = vec![Row::new(cells).height(2)];

        Table::new(rows, [Constraint::Percentage(20); 5])
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::NONE)
                    .title(format!(
                        "Woche ab {:02}.{:02}.{}",
                        monday.day(),
                        monday.month(),
                        monday.year()
                    ))
                    .title_style(Style::default().fg(theme.colors.header))
                    .title_alignment(Alignment::Center),
            )
            .column_spacing(1)
    }

    fn create_summary(summary: &ScheduleSummary, theme: &Theme) -> Paragraph<'static> {
        let next_line = match &summary.next {
            Some(next) => format!(
                "Nächster Termin: {} ({} {})",
                next.title,
                german_day(next.start.weekday()),
                next.start.format("%H:%M")
            ),
            None => "Keine anstehenden Termine".to_string(),
        };

        let lines = vec![
            Line::from(Span::styled(
                format!("Aktive Termine: {}", summary.active),
                Style::default().fg(theme.colors.normal_text),
            )),
            Line::from(Span::styled(
                format!("Wichtig: {}", summary.important),
                Style::default().fg(theme.colors.important),
            )),
            Line::from(Span::styled(
                next_line,
                Style::default().fg(theme.colors.accent),
            )),
        ];

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(theme.colors.dimmed)),
            )
            .alignment(Alignment::Left)
    }

    fn create_day_panel(
        date: NaiveDate,
        day_lines: &[String],
        theme: &Theme,
    ) -> Paragraph<'static> {
        let mut lines = vec![Line::from(Span::styled(
            format!(
                "{}, {:02}.{:02}.{}",
                german_day(date.weekday()),
                date.day(),
                date.month(),
                date.year()
            ),
            Style::default()
                .fg(theme.colors.header)
                .add_modifier(Modifier::BOLD),
        ))];

        if day_lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Keine Termine".to_string(),
                Style::default().fg(theme.colors.dimmed),
            )));
        } else {
            for text in day_lines {
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(theme.colors.normal_text),
                )));
            }
        }

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Left)
    }

    fn create_help_text(selected_date: NaiveDate, theme: &Theme) -> Paragraph<'static> {
        let help_text = vec![
            Line::from(Span::styled(
                "t=Heute • w=Woche • m=Monat • a=Alles • c=Kategorie • d=Hell/Dunkel • r=Neu laden • q=Beenden",
                Style::default().fg(theme.colors.dimmed),
            )),
            Line::from(Span::styled(
                format!(
                    "{}, {:02}.{:02}.{}",
                    german_day(selected_date.weekday()),
                    selected_date.day(),
                    selected_date.month(),
                    selected_date.year()
                ),
                Style::default().fg(theme.colors.accent),
            )),
        ];

        Paragraph::new(help_text)
            .block(Block::default().borders(Borders::NONE))
            .alignment(Alignment::Center)
    }

    /// Explicit cleanup method
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl<'a> Drop for CalendarView<'a> {
    fn drop(&mut self) {
        // Fallback cleanup if explicit cleanup wasn't called
        let _ = self.cleanup();
    }
}

fn german_day(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Di",
        Weekday::Wed => "Mi",
        Weekday::Thu => "Do",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "So",
    }
}

fn german_month(month: u32) -> &'static str {
    match month {
        1 => "Januar",
        2 => "Februar",
        3 => "März",
        4 => "April",
        5 => "Mai",
        6 => "Juni",
        7 => "Juli",
        8 => "August",
        9 => "September",
        10 => "Oktober",
        11 => "November",
        12 => "Dezember",
        _ => "",
    }
}
