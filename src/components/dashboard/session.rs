use crate::components::calendar_view::{
    build_grid, events_on_date, CalendarEvent, CalendarGrid, NavigationState, QueryRange, ViewMode,
};
use crate::components::sync::{ExportedCalendar, ImportSummary, SyncState};
use crate::error::CalendarResult;
use chrono::{NaiveDate, Utc};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Which dashboard a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardKind {
    Participant,
    University,
}

impl DashboardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DashboardKind::Participant => "participant",
            DashboardKind::University => "university",
        }
    }

    /// Name used to register and toggle the dashboard component
    pub fn component_name(self) -> &'static str {
        match self {
            DashboardKind::Participant => "participant_calendar",
            DashboardKind::University => "university_calendar",
        }
    }
}

/// One user-initiated change to what the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    GoToday,
    Advance,
    Retreat,
    SetViewMode(ViewMode),
    Select(NaiveDate),
    ClearSelection,
}

/// What happened to a fetch response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied(usize),
    Failed,
    /// Requested for a range that is no longer on screen
    Stale,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FetchFailed { range: QueryRange, message: String },
    ImportFailed { message: String },
    Imported { name: String, events_found: u32 },
    Disconnected,
    Exported { file_name: String },
    SyncFailed { message: String },
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notice::FetchFailed { .. } | Notice::ImportFailed { .. } | Notice::SyncFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FetchFailed { range, message } => {
                write!(f, "Could not load events for {}: {}", range, message)
            }
            Notice::ImportFailed { message } => write!(f, "Calendar import failed: {}", message),
            Notice::Imported { name, events_found } => {
                write!(f, "Imported {} events from {}", events_found, name)
            }
            Notice::Disconnected => f.write_str("External calendar disconnected"),
            Notice::Exported { file_name } => write!(f, "Registered events exported to {}", file_name),
            Notice::SyncFailed { message } => write!(f, "Calendar sync failed: {}", message),
        }
    }
}

/// Snapshot of a session for hosts and tests
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStatus {
    pub navigation: NavigationState,
    pub active_range: QueryRange,
    pub loading: bool,
    pub in_flight: usize,
    pub sync: SyncState,
}

/// State of one dashboard's calendar: navigation, sync status and fetched events.
///
/// Every fetch is keyed by the range it was requested for. A response is only
/// applied while that range is still the active one, and a range already being
/// fetched is never requested twice at the same time.
#[derive(Debug, Clone)]
pub struct CalendarSession {
    kind: DashboardKind,
    navigation: NavigationState,
    sync: SyncState,
    events: Vec<CalendarEvent>,
    loaded_range: Option<QueryRange>,
    in_flight: HashSet<QueryRange>,
    notices: VecDeque<Notice>,
}

impl CalendarSession {
    pub fn new(kind: DashboardKind, today: NaiveDate, view_mode: ViewMode) -> Self {
        Self {
            kind,
            navigation: NavigationState::new(today, view_mode),
            sync: SyncState::default(),
            events: Vec::new(),
            loaded_range: None,
            in_flight: HashSet::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    pub fn active_range(&self) -> QueryRange {
        self.navigation.active_range()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn status(&self) -> DashboardStatus {
        DashboardStatus {
            navigation: self.navigation,
            active_range: self.active_range(),
            loading: self.is_loading(),
            in_flight: self.in_flight.len(),
            sync: self.sync.clone(),
        }
    }

    /// Events for the active range have not landed yet
    pub fn is_loading(&self) -> bool {
        self.loaded_range != Some(self.active_range())
    }

    /// Apply a navigation step. Returns the range to fetch when the step
    /// changed the reference date or view mode.
    pub fn navigate(&mut self, step: Navigation, today: NaiveDate) -> Option<QueryRange> {
        let current = self.navigation;
        let next = match step {
            Navigation::GoToday => current.go_today(today),
            Navigation::Advance => current.advance(),
            Navigation::Retreat => current.retreat(),
            Navigation::SetViewMode(mode) => current.with_view_mode(mode),
            Navigation::Select(date) => current.select(date),
            Navigation::ClearSelection => current.clear_selection(),
        };
        self.navigation = next;

        if current.needs_refetch(&next) {
            debug!(
                dashboard = self.kind.as_str(),
                reference = %next.reference_date,
                view = next.view_mode.as_key(),
                "Calendar navigation"
            );
            self.request_fetch()
        } else {
            None
        }
    }

    /// Claim a fetch of the active range unless one is already pending
    pub fn request_fetch(&mut self) -> Option<QueryRange> {
        let range = self.active_range();
        if !self.in_flight.insert(range) {
            debug!(dashboard = self.kind.as_str(), %range, "Fetch already in flight");
            return None;
        }
        Some(range)
    }

    /// Apply a fetch response for `range`
    pub fn apply_fetch(
        &mut self,
        range: QueryRange,
        result: CalendarResult<Vec<CalendarEvent>>,
    ) -> FetchOutcome {
        self.in_flight.remove(&range);
        if range != self.active_range() {
            debug!(dashboard = self.kind.as_str(), %range, "Discarding stale calendar response");
            return FetchOutcome::Stale;
        }

        self.loaded_range = Some(range);
        match result {
            Ok(events) => {
                let count = events.len();
                self.events = events;
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                error!(dashboard = self.kind.as_str(), %range, "Calendar fetch failed: {}", e);
                self.events.clear();
                self.notices.push_back(Notice::FetchFailed {
                    range,
                    message: e.to_string(),
                });
                FetchOutcome::Failed
            }
        }
    }

    /// Events shown for the active range
    pub fn visible_events(&self) -> &[CalendarEvent] {
        if self.is_loading() {
            &[]
        } else {
            &self.events
        }
    }

    pub fn grid(&self, today: NaiveDate) -> CalendarGrid {
        let mut grid = build_grid(
            self.visible_events(),
            self.navigation.reference_date,
            self.navigation.view_mode,
            today,
        );
        grid.loading = self.is_loading();
        grid
    }

    /// Full event list for the selected date, if a date is selected
    pub fn drilldown(&self) -> Option<Vec<CalendarEvent>> {
        self.navigation
            .selected_date
            .map(|date| events_on_date(self.visible_events(), date))
    }

    /// Update sync status from an import attempt; failures leave it untouched
    pub fn record_import(&mut self, name: &str, result: &CalendarResult<ImportSummary>) {
        match result {
            Ok(summary) => {
                info!(
                    dashboard = self.kind.as_str(),
                    source = name,
                    events_found = summary.events_found,
                    "External calendar imported"
                );
                self.sync.record_import(name, *summary, Utc::now());
                self.notices.push_back(Notice::Imported {
                    name: name.to_string(),
                    events_found: summary.events_found,
                });
            }
            Err(e) => {
                warn!(dashboard = self.kind.as_str(), source = name, "Calendar import failed: {}", e);
                let notice = if e.is_import_failure() {
                    Notice::ImportFailed {
                        message: e.to_string(),
                    }
                } else {
                    Notice::SyncFailed {
                        message: e.to_string(),
                    }
                };
                self.notices.push_back(notice);
            }
        }
    }

    pub fn record_disconnect(&mut self, result: &CalendarResult<()>) {
        match result {
            Ok(()) => {
                if self.sync.connected {
                    self.notices.push_back(Notice::Disconnected);
                }
                self.sync.disconnect();
            }
            Err(e) => {
                warn!(dashboard = self.kind.as_str(), "Calendar disconnect failed: {}", e);
                self.notices.push_back(Notice::SyncFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Name exported bytes for download
    pub fn export_file(
        &mut self,
        result: CalendarResult<Vec<u8>>,
        today: NaiveDate,
    ) -> CalendarResult<ExportedCalendar> {
        match result {
            Ok(bytes) => {
                let export = ExportedCalendar::new(self.kind.as_str(), today, bytes);
                self.notices.push_back(Notice::Exported {
                    file_name: export.file_name.clone(),
                });
                Ok(export)
            }
            Err(e) => {
                self.notices.push_back(Notice::SyncFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar_view::Origin;
    use crate::error::{fetch_error, Error};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, day: &str) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            date: day.to_string(),
            origin: Origin::Club,
            is_registered: true,
            ..Default::default()
        }
    }

    fn loaded_session() -> CalendarSession {
        let mut session = CalendarSession::new(DashboardKind::Participant, date(2024, 3, 15), ViewMode::Month);
        let range = session.request_fetch().unwrap();
        session.apply_fetch(range, Ok(vec![event("Hack night", "2024-03-10")]));
        session
    }

    #[test]
    fn test_initial_fetch_and_grid() {
        let mut session = CalendarSession::new(DashboardKind::Participant, date(2024, 3, 15), ViewMode::Month);
        assert!(session.is_loading());
        assert!(session.grid(date(2024, 3, 15)).loading);

        let range = session.request_fetch().unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 31));

        let outcome = session.apply_fetch(range, Ok(vec![event("Hack night", "2024-03-10")]));
        assert_eq!(outcome, FetchOutcome::Applied(1));

        let grid = session.grid(date(2024, 3, 15));
        assert!(!grid.loading);
        assert_eq!(grid.day(date(2024, 3, 10)).unwrap().events.len(), 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = CalendarSession::new(DashboardKind::Participant, date(2024, 3, 15), ViewMode::Month);
        let march = session.request_fetch().unwrap();
        let april = session.navigate(Navigation::Advance, date(2024, 3, 15)).unwrap();
        assert_ne!(march, april);

        session.apply_fetch(april, Ok(vec![event("April thing", "2024-04-02")]));
        let outcome = session.apply_fetch(march, Ok(vec![event("March thing", "2024-03-05")]));
        assert_eq!(outcome, FetchOutcome::Stale);

        let grid = session.grid(date(2024, 3, 15));
        assert_eq!(grid.range, april);
        assert_eq!(grid.days().map(|d| d.events.len()).sum::<usize>(), 1);
        assert_eq!(session.visible_events()[0].title, "April thing");
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn test_stale_response_before_current_one_is_also_dropped() {
        let mut session = CalendarSession::new(DashboardKind::University, date(2024, 3, 15), ViewMode::Month);
        let march = session.request_fetch().unwrap();
        session.navigate(Navigation::SetViewMode(ViewMode::Week), date(2024, 3, 15));

        assert_eq!(session.apply_fetch(march, Ok(vec![event("x", "2024-03-12")])), FetchOutcome::Stale);
        assert!(session.is_loading());
        assert!(session.grid(date(2024, 3, 15)).days().all(|d| d.events.is_empty()));
    }

    #[test]
    fn test_duplicate_fetches_are_not_requested() {
        let mut session = CalendarSession::new(DashboardKind::Participant, date(2024, 3, 15), ViewMode::Week);
        let week = session.request_fetch().unwrap();
        assert_eq!(session.request_fetch(), None);

        // leaving and coming back while the first request is pending
        let next_week = session.navigate(Navigation::Advance, date(2024, 3, 15));
        assert!(next_week.is_some());
        assert_eq!(session.navigate(Navigation::Retreat, date(2024, 3, 15)), None);
        assert_eq!(session.in_flight(), 2);

        assert_eq!(session.apply_fetch(week, Ok(vec![])), FetchOutcome::Applied(0));
        assert!(!session.is_loading());
        assert_eq!(session.request_fetch(), Some(week));
    }

    #[test]
    fn test_fetch_failure_renders_empty_grid() {
        let mut session = loaded_session();
        let april = session.navigate(Navigation::Advance, date(2024, 3, 15)).unwrap();
        let outcome = session.apply_fetch(april, Err(fetch_error("HTTP 500")));
        assert_eq!(outcome, FetchOutcome::Failed);

        let grid = session.grid(date(2024, 3, 15));
        assert!(!grid.loading);
        assert_eq!(grid.days().count(), 30);
        assert!(grid.days().all(|d| d.events.is_empty()));

        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(&notices[0], Notice::FetchFailed { range, .. } if *range == april));
        assert!(session.take_notices().is_empty());

        // navigation still works after a failure
        assert!(session.navigate(Navigation::Retreat, date(2024, 3, 15)).is_some());
    }

    #[test]
    fn test_selection_uses_loaded_events_only() {
        let mut session = loaded_session();
        assert_eq!(session.drilldown(), None);

        assert_eq!(session.navigate(Navigation::Select(date(2024, 3, 10)), date(2024, 3, 15)), None);
        let events = session.drilldown().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(session.in_flight(), 0);

        let before = session.active_range();
        assert_eq!(session.navigate(Navigation::ClearSelection, date(2024, 3, 15)), None);
        assert_eq!(session.drilldown(), None);
        assert_eq!(session.active_range(), before);
    }

    #[test]
    fn test_go_today_on_today_does_not_refetch() {
        let mut session = loaded_session();
        assert_eq!(session.navigate(Navigation::GoToday, date(2024, 3, 15)), None);
        assert!(session.navigate(Navigation::GoToday, date(2024, 5, 1)).is_some());
    }

    #[test]
    fn test_import_and_disconnect_update_sync_state() {
        let mut session = loaded_session();

        session.record_import(
            "https://uni.example/cal.ics",
            &Err(Error::InvalidCalendarUrl("nope".to_string())),
        );
        assert!(!session.sync_state().connected);
        assert!(matches!(session.take_notices()[0], Notice::ImportFailed { .. }));

        session.record_import("timetable", &Ok(ImportSummary { events_found: 4 }));
        assert!(session.sync_state().connected);
        assert_eq!(session.sync_state().source_calendars[0].name, "timetable");

        session.record_disconnect(&Ok(()));
        session.record_disconnect(&Ok(()));
        assert!(!session.sync_state().connected);
        assert!(session.sync_state().source_calendars.is_empty());
        let notices = session.take_notices();
        assert_eq!(notices.iter().filter(|n| **n == Notice::Disconnected).count(), 1);
    }

    #[test]
    fn test_export_file_name() {
        let mut session = loaded_session();
        let export = session
            .export_file(Ok(b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_vec()), date(2024, 3, 15))
            .unwrap();
        assert_eq!(export.file_name, "participant-events-2024-03-15.ics");

        assert!(session.export_file(Err(fetch_error("down")), date(2024, 3, 15)).is_err());
        let notices = session.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(matches!(&notices[0], Notice::Exported { file_name } if file_name == "participant-events-2024-03-15.ics"));
        assert!(matches!(notices[1], Notice::SyncFailed { .. }));
    }
}
