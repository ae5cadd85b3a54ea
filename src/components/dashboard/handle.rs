use super::actor::{DashboardActor, DashboardActorHandle};
use super::session::{DashboardKind, DashboardStatus, Navigation, Notice};
use crate::components::calendar_view::{CalendarEvent, CalendarGrid, ViewMode};
use crate::components::sync::{CalendarFile, ImportSummary, SyncAdapter, SyncState};
use crate::error::{fetch_error, other_error, CalendarResult};
use crate::utils::time::Clock;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Handle for interacting with one calendar dashboard
#[derive(Clone)]
pub struct DashboardHandle {
    kind: DashboardKind,
    actor_handle: DashboardActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Create a new DashboardHandle and spawn the actor.
    ///
    /// The actor immediately fetches the range around `clock.today()`.
    pub fn new(
        kind: DashboardKind,
        adapter: Arc<dyn SyncAdapter>,
        clock: Arc<dyn Clock>,
        view_mode: ViewMode,
    ) -> Self {
        let (mut actor, handle) = DashboardActor::new(kind, adapter, clock, view_mode);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            kind,
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    /// Jump back to the period containing today
    pub async fn go_today(&self) -> CalendarResult<CalendarGrid> {
        self.actor_handle.navigate(Navigation::GoToday).await
    }

    /// Next month or week
    pub async fn advance(&self) -> CalendarResult<CalendarGrid> {
        self.actor_handle.navigate(Navigation::Advance).await
    }

    /// Previous month or week
    pub async fn retreat(&self) -> CalendarResult<CalendarGrid> {
        self.actor_handle.navigate(Navigation::Retreat).await
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) -> CalendarResult<CalendarGrid> {
        self.actor_handle
            .navigate(Navigation::SetViewMode(view_mode))
            .await
    }

    /// Select a day for the drill-down panel and return its events
    pub async fn select_date(&self, date: NaiveDate) -> CalendarResult<Vec<CalendarEvent>> {
        self.actor_handle.navigate(Navigation::Select(date)).await?;
        Ok(self.actor_handle.drilldown().await?.unwrap_or_default())
    }

    pub async fn clear_selection(&self) -> CalendarResult<()> {
        self.actor_handle
            .navigate(Navigation::ClearSelection)
            .await
            .map(|_| ())
    }

    /// Current grid, empty and marked loading until its events arrive
    pub async fn grid(&self) -> CalendarResult<CalendarGrid> {
        self.actor_handle.grid().await
    }

    /// Events of the selected date, `None` when nothing is selected
    pub async fn drilldown(&self) -> CalendarResult<Option<Vec<CalendarEvent>>> {
        self.actor_handle.drilldown().await
    }

    pub async fn status(&self) -> CalendarResult<DashboardStatus> {
        self.actor_handle.status().await
    }

    pub async fn sync_state(&self) -> CalendarResult<SyncState> {
        Ok(self.actor_handle.status().await?.sync)
    }

    /// Drain queued user-facing notices
    pub async fn take_notices(&self) -> CalendarResult<Vec<Notice>> {
        self.actor_handle.take_notices().await
    }

    /// Refetch the active range. Returns false when that fetch is already running.
    pub async fn refresh(&self) -> CalendarResult<bool> {
        self.actor_handle.refresh().await
    }

    pub async fn import_by_url(&self, url: &str) -> CalendarResult<ImportSummary> {
        self.actor_handle.import_by_url(url.to_string()).await
    }

    pub async fn import_by_file(&self, file: CalendarFile) -> CalendarResult<ImportSummary> {
        self.actor_handle.import_by_file(file).await
    }

    pub async fn disconnect(&self) -> CalendarResult<()> {
        self.actor_handle.disconnect().await
    }

    /// Export registered events and write them into `dir`
    pub async fn export_to(&self, dir: &Path) -> CalendarResult<PathBuf> {
        let exported = self.actor_handle.export().await?;
        exported.save_to(dir)
    }

    /// Wait until the active range has finished loading
    pub async fn wait_until_loaded(&self, limit: Duration) -> CalendarResult<CalendarGrid> {
        let mut loading = self.actor_handle.loading();
        timeout(limit, loading.wait_for(|loading| !*loading))
            .await
            .map_err(|_| {
                fetch_error(&format!("Timed out loading {} calendar", self.kind.as_str()))
            })?
            .map_err(|_| other_error("Dashboard actor stopped"))?;
        self.grid().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
