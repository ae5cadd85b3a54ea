mod actor;
mod handle;
pub mod render;
mod scheduler;
pub mod session;

pub use handle::DashboardHandle;
pub use scheduler::start_refresh_scheduler;
pub use session::{
    CalendarSession, DashboardKind, DashboardStatus, FetchOutcome, Navigation, Notice,
};

use crate::components::sync::{BackendClient, SyncAdapter};
use crate::config::Config;
use crate::error::CalendarResult;
use crate::utils::time::SystemClock;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

/// A participant or university calendar dashboard run as a component
pub struct CalendarDashboard {
    kind: DashboardKind,
    adapter: Option<Arc<dyn SyncAdapter>>,
    handle: RwLock<Option<DashboardHandle>>,
    scheduler: RwLock<Option<JoinHandle<()>>>,
}

impl CalendarDashboard {
    /// Dashboard talking to the backend configured in `Config`
    pub fn new(kind: DashboardKind) -> Self {
        Self {
            kind,
            adapter: None,
            handle: RwLock::new(None),
            scheduler: RwLock::new(None),
        }
    }

    /// Dashboard using the given adapter instead of the HTTP backend
    pub fn with_adapter(kind: DashboardKind, adapter: Arc<dyn SyncAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> DashboardKind {
        self.kind
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<DashboardHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for CalendarDashboard {
    fn name(&self) -> &'static str {
        self.kind.component_name()
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> CalendarResult<()> {
        let (adapter, timezone, view_mode, period) = {
            let config = config.read().await;
            let adapter: Arc<dyn SyncAdapter> = match &self.adapter {
                Some(adapter) => Arc::clone(adapter),
                None => Arc::new(BackendClient::new(&config)?),
            };
            (
                adapter,
                config.timezone()?,
                config.default_view,
                Duration::from_secs(config.refresh_interval_secs),
            )
        };

        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_some() {
            return Ok(());
        }

        let handle = DashboardHandle::new(
            self.kind,
            adapter,
            Arc::new(SystemClock::new(timezone)),
            view_mode,
        );
        *self.scheduler.write().await = Some(start_refresh_scheduler(handle.clone(), period));
        *handle_lock = Some(handle);

        info!(
            dashboard = self.kind.as_str(),
            view = view_mode.as_key(),
            %timezone,
            "Calendar dashboard started"
        );
        Ok(())
    }

    async fn shutdown(&self) -> CalendarResult<()> {
        if let Some(scheduler) = self.scheduler.write().await.take() {
            scheduler.abort();
        }
        if let Some(handle) = self.handle.write().await.take() {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
