mod client;
pub mod models;

pub use client::BackendClient;
pub use models::{CalendarFile, ExportedCalendar, ImportSummary, SourceCalendar, SyncState};

use crate::components::calendar_view::models::{CalendarEvent, QueryRange};
use crate::error::CalendarResult;
use async_trait::async_trait;

/// Backend operations the calendar engine depends on.
///
/// Implemented over HTTP by [`BackendClient`]; tests supply their own.
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Merged club and university events for an inclusive date range
    async fn fetch_range(&self, range: QueryRange) -> CalendarResult<Vec<CalendarEvent>>;

    /// Attach an external iCal feed
    async fn import_by_url(&self, url: &str) -> CalendarResult<ImportSummary>;

    /// Upload an .ics file
    async fn import_by_file(&self, file: CalendarFile) -> CalendarResult<ImportSummary>;

    /// Detach synced calendars; calling it twice is fine
    async fn disconnect(&self) -> CalendarResult<()>;

    /// The participant's registered events as an .ics document
    async fn export_registered(&self) -> CalendarResult<Vec<u8>>;
}
