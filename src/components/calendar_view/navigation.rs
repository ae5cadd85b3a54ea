use super::models::{QueryRange, ViewMode};
use super::range::resolve_range;
use crate::utils::time::{add_days, add_months_clipped};
use chrono::NaiveDate;

/// What the dashboard is looking at. Transitions return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub reference_date: NaiveDate,
    pub view_mode: ViewMode,
    pub selected_date: Option<NaiveDate>,
}

impl NavigationState {
    /// Fresh state on dashboard mount
    pub fn new(today: NaiveDate, view_mode: ViewMode) -> Self {
        Self {
            reference_date: today,
            view_mode,
            selected_date: None,
        }
    }

    /// Range the grid currently covers
    pub fn active_range(&self) -> QueryRange {
        resolve_range(self.reference_date, self.view_mode).range
    }

    #[must_use]
    pub fn go_today(self, today: NaiveDate) -> Self {
        Self {
            reference_date: today,
            ..self
        }
    }

    /// One month or one week forward
    #[must_use]
    pub fn advance(self) -> Self {
        self.step(1)
    }

    /// One month or one week back
    #[must_use]
    pub fn retreat(self) -> Self {
        self.step(-1)
    }

    #[must_use]
    pub fn with_view_mode(self, view_mode: ViewMode) -> Self {
        Self { view_mode, ..self }
    }

    /// Pick a date for the drill-down panel; grid and range are untouched
    #[must_use]
    pub fn select(self, date: NaiveDate) -> Self {
        Self {
            selected_date: Some(date),
            ..self
        }
    }

    #[must_use]
    pub fn clear_selection(self) -> Self {
        Self {
            selected_date: None,
            ..self
        }
    }

    /// Whether moving from `self` to `next` requires new data
    pub fn needs_refetch(&self, next: &Self) -> bool {
        self.reference_date != next.reference_date || self.view_mode != next.view_mode
    }

    fn step(self, direction: i32) -> Self {
        let reference_date = match self.view_mode {
            ViewMode::Month => add_months_clipped(self.reference_date, direction),
            ViewMode::Week => add_days(self.reference_date, 7 * direction as i64),
        };
        Self {
            reference_date,
            ..self
        }
    }
}
