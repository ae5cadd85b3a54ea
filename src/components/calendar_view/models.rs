use crate::error::{CalendarResult, Error};
use crate::utils::time::{format_iso_date, parse_calendar_date};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::summary::DaySummary;

/// Granularity of the calendar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

impl ViewMode {
    pub fn as_key(self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "month" => Some(ViewMode::Month),
            "week" => Some(ViewMode::Week),
            _ => None,
        }
    }
}

/// Where an event came from. Decides summarization priority, never ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    University,
    #[default]
    #[serde(other)]
    Club,
}

/// Local identifier of an event; the backend sends numbers, synced entries may send text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(id) => write!(f, "{}", id),
            EventId::Text(id) => f.write_str(id),
        }
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One occurrence to display, as returned by `GET events/calendar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<EventId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Opaque calendar date; only its `YYYY-MM-DD` prefix is meaningful
    pub date: String,
    /// Display-only time text such as "6:00 PM"
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub origin: Origin,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_registered: bool,
    /// Computed by the backend; never derived here
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_conflict: bool,
    #[serde(default)]
    pub club_name: Option<String>,
    #[serde(default)]
    pub club_category: Option<String>,
}

impl CalendarEvent {
    /// Grouping key of this event's date
    pub fn date_key(&self) -> CalendarResult<DateKey> {
        DateKey::parse(&self.date)
    }

    /// Registered club event held by the viewing participant
    pub fn is_registered_club(&self) -> bool {
        self.origin == Origin::Club && self.is_registered
    }
}

/// Canonical day-granularity key used to decide "same day"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn parse(raw: &str) -> CalendarResult<Self> {
        parse_calendar_date(raw)
            .map(DateKey)
            .ok_or_else(|| Error::EventParse(format!("unrecognized date '{}'", raw)))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_iso_date(self.0))
    }
}

/// Inclusive date range requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for QueryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", format_iso_date(self.start), format_iso_date(self.end))
    }
}

/// A real day in the grid
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub key: DateKey,
    pub events: Vec<CalendarEvent>,
    pub summary: DaySummary,
    pub is_today: bool,
    /// Full weekday name, week view only
    pub day_name: Option<&'static str>,
}

/// One grid slot. Padding exists only in month view, carries no events and is never clickable.
#[derive(Debug, Clone, PartialEq)]
pub enum DayCell {
    Padding,
    Day(CalendarDay),
}

impl DayCell {
    pub fn day(&self) -> Option<&CalendarDay> {
        match self {
            DayCell::Padding => None,
            DayCell::Day(day) => Some(day),
        }
    }

    pub fn is_padding(&self) -> bool {
        matches!(self, DayCell::Padding)
    }

    /// Date to drill into when the cell is clicked
    pub fn click_target(&self) -> Option<NaiveDate> {
        self.day().map(|day| day.date)
    }
}

/// Rows of exactly seven cells
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarGrid {
    pub view_mode: ViewMode,
    pub range: QueryRange,
    pub title: String,
    pub rows: Vec<Vec<DayCell>>,
    /// Events for `range` have not arrived yet
    pub loading: bool,
}

impl CalendarGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.rows.iter().flatten()
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.cells().filter_map(DayCell::day)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|day| day.date == date)
    }
}
