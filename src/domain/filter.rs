use crate::domain::{DateBoundaries, DateWindow};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

/// Sentinel the category picker emits for "no restriction". The projector
/// treats a set containing it the same as an empty set.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid date window: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// The currently selected filter. Immutable: every change produces a new
/// value, the surrounding screen swaps it wholesale and re-derives everything
/// downstream from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterValue {
    categories: BTreeSet<String>,
    window: DateWindow,
    client: Option<String>,
}

impl FilterValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the date window. A window with `start > end` never becomes
    /// part of a `FilterValue`; it is rejected here, before the reconciler or
    /// projector can see it.
    pub fn with_window(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, FilterError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterError::InvalidRange { start, end });
            }
        }
        self.window = DateWindow { start, end };
        Ok(self)
    }

    pub fn with_client(mut self, client: Option<String>) -> Self {
        self.client = client.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn preset(&self, boundaries: &DateBoundaries) -> PresetMatch {
        classify_window(&self.window, boundaries)
    }

    pub fn view_directive(&self, boundaries: &DateBoundaries) -> ViewDirective {
        derive_view_directive(&self.window, boundaries)
    }
}

/// Which named preset, if any, the current window corresponds to. Derived on
/// the fly for highlighting the matching preset control; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetMatch {
    Today,
    ThisWeek,
    ThisMonth,
    Custom,
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

/// Instruction for the calendar view: which granularity to display and,
/// when one can be justified, which date to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDirective {
    pub view_mode: ViewMode,
    pub anchor: Option<NaiveDate>,
}

/// Preset matching is exact equality on both endpoints; a single-day window
/// on any date other than today is `Custom`, not `Today`.
pub fn classify_window(window: &DateWindow, boundaries: &DateBoundaries) -> PresetMatch {
    if window.is_unbounded() {
        PresetMatch::Unbounded
    } else if *window == boundaries.today {
        PresetMatch::Today
    } else if *window == boundaries.this_week {
        PresetMatch::ThisWeek
    } else if *window == boundaries.this_month {
        PresetMatch::ThisMonth
    } else {
        PresetMatch::Custom
    }
}

/// Map the window onto the nearest granularity the calendar natively renders.
/// An arbitrary custom range and a missing window both fall back to month
/// view without forcing an anchor, since no anchor can be justified for them.
pub fn derive_view_directive(window: &DateWindow, boundaries: &DateBoundaries) -> ViewDirective {
    match window.bounds() {
        Some((start, end)) if start == end => ViewDirective {
            view_mode: ViewMode::Day,
            anchor: Some(start),
        },
        Some((start, _)) if *window == boundaries.this_week => ViewDirective {
            view_mode: ViewMode::Week,
            anchor: Some(start),
        },
        Some((start, _)) if *window == boundaries.this_month => ViewDirective {
            view_mode: ViewMode::Month,
            anchor: Some(start),
        },
        _ => ViewDirective {
            view_mode: ViewMode::Month,
            anchor: None,
        },
    }
}
