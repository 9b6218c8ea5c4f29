use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar-day window. Either side may be absent, meaning unbounded on
/// that side. Both sides absent means "no date restriction at all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: Some(date),
            end: Some(date),
        }
    }

    pub fn closed(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both endpoints, when the window is closed on both sides.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// The three named calendar windows, computed once from a reference date and
/// then compared against by the filter layer. Calling `at` twice with the
/// same reference date yields identical boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBoundaries {
    pub today: DateWindow,
    pub this_week: DateWindow,
    pub this_month: DateWindow,
}

impl DateBoundaries {
    pub fn at(reference: NaiveDate) -> Self {
        Self {
            today: DateWindow::single(reference),
            this_week: week_of(reference),
            this_month: month_of(reference),
        }
    }

    /// Boundaries for the local wall-clock date. All date math stays on local
    /// calendar components; nothing is routed through UTC.
    pub fn now() -> Self {
        Self::at(Local::now().date_naive())
    }
}

/// The work week containing `reference`: Monday through Friday. A Sunday
/// reference rolls back six days to the previous Monday.
pub fn week_of(reference: NaiveDate) -> DateWindow {
    let monday = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
    let friday = monday + Duration::days(4);
    DateWindow::closed(monday, friday)
}

/// First through last calendar day of the month containing `reference`.
pub fn month_of(reference: NaiveDate) -> DateWindow {
    let start = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1)
        .expect("invalid year/month");
    let end = if reference.month() == 12 {
        NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, 1)
    }
    .expect("invalid date calculation")
    .pred_opt()
    .expect("invalid month end calculation");

    DateWindow::closed(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn boundaries_for_a_midweek_reference() {
        let boundaries = DateBoundaries::at(date(2024, 5, 15)); // a Wednesday

        assert_eq!(boundaries.today, DateWindow::single(date(2024, 5, 15)));
        assert_eq!(
            boundaries.this_week,
            DateWindow::closed(date(2024, 5, 13), date(2024, 5, 17))
        );
        assert_eq!(
            boundaries.this_month,
            DateWindow::closed(date(2024, 5, 1), date(2024, 5, 31))
        );
    }

    #[test]
    fn sunday_rolls_back_to_the_previous_work_week() {
        let week = week_of(date(2024, 5, 12)); // a Sunday
        assert_eq!(
            week,
            DateWindow::closed(date(2024, 5, 6), date(2024, 5, 10))
        );
    }

    #[test]
    fn week_always_runs_monday_through_friday() {
        let mut day = date(2023, 11, 1);
        let last = date(2024, 3, 1);
        while day <= last {
            let (start, end) = week_of(day).bounds().unwrap();
            assert_eq!(start.weekday(), Weekday::Mon);
            assert_eq!(end.weekday(), Weekday::Fri);
            assert_eq!(end - start, Duration::days(4));
            day += Duration::days(1);
        }
    }

    #[test]
    fn month_end_handles_short_and_leap_months() {
        assert_eq!(
            month_of(date(2024, 2, 10)).bounds().unwrap().1,
            date(2024, 2, 29)
        );
        assert_eq!(
            month_of(date(2023, 2, 10)).bounds().unwrap().1,
            date(2023, 2, 28)
        );
        assert_eq!(
            month_of(date(2024, 4, 1)).bounds().unwrap().1,
            date(2024, 4, 30)
        );
        assert_eq!(
            month_of(date(2024, 12, 31)).bounds().unwrap().1,
            date(2024, 12, 31)
        );
    }

    #[test]
    fn month_start_is_always_the_first() {
        for m in 1..=12 {
            let (start, _) = month_of(date(2024, m, 15)).bounds().unwrap();
            assert_eq!(start.day(), 1);
        }
    }

    #[test]
    fn boundaries_are_referentially_transparent() {
        let reference = date(2024, 5, 15);
        assert_eq!(DateBoundaries::at(reference), DateBoundaries::at(reference));
    }

    #[test]
    fn window_containment() {
        let window = DateWindow::closed(date(2024, 5, 13), date(2024, 5, 17));
        assert!(window.contains(date(2024, 5, 13)));
        assert!(window.contains(date(2024, 5, 17)));
        assert!(!window.contains(date(2024, 5, 18)));

        assert!(DateWindow::unbounded().contains(date(1999, 1, 1)));

        let open_ended = DateWindow {
            start: Some(date(2024, 5, 13)),
            end: None,
        };
        assert!(open_ended.contains(date(2030, 1, 1)));
        assert!(!open_ended.contains(date(2024, 5, 12)));
    }
}
