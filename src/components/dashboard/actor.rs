use super::session::{CalendarSession, DashboardKind, DashboardStatus, Navigation, Notice};
use crate::components::calendar_view::{CalendarEvent, CalendarGrid, QueryRange, ViewMode};
use crate::components::sync::{CalendarFile, ExportedCalendar, ImportSummary, SyncAdapter};
use crate::error::{other_error, CalendarResult};
use crate::utils::time::Clock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// The dashboard actor owning one calendar session
pub struct DashboardActor {
    session: CalendarSession,
    adapter: Arc<dyn SyncAdapter>,
    clock: Arc<dyn Clock>,
    command_rx: mpsc::Receiver<DashboardCommand>,
    loading_tx: watch::Sender<bool>,
    // Weak so dropping every handle still stops the actor
    self_tx: mpsc::WeakSender<DashboardCommand>,
}

/// Commands that can be sent to the dashboard actor
pub enum DashboardCommand {
    Navigate(Navigation, mpsc::Sender<CalendarGrid>),
    GetGrid(mpsc::Sender<CalendarGrid>),
    GetDrilldown(mpsc::Sender<Option<Vec<CalendarEvent>>>),
    GetStatus(mpsc::Sender<DashboardStatus>),
    TakeNotices(mpsc::Sender<Vec<Notice>>),
    Refresh(mpsc::Sender<bool>),
    ImportUrl(String, mpsc::Sender<CalendarResult<ImportSummary>>),
    ImportFile(CalendarFile, mpsc::Sender<CalendarResult<ImportSummary>>),
    Disconnect(mpsc::Sender<CalendarResult<()>>),
    Export(mpsc::Sender<CalendarResult<ExportedCalendar>>),
    FetchCompleted {
        range: QueryRange,
        result: CalendarResult<Vec<CalendarEvent>>,
    },
    ImportCompleted {
        name: String,
        result: CalendarResult<ImportSummary>,
        respond_to: mpsc::Sender<CalendarResult<ImportSummary>>,
    },
    DisconnectCompleted {
        result: CalendarResult<()>,
        respond_to: mpsc::Sender<CalendarResult<()>>,
    },
    ExportCompleted {
        result: CalendarResult<Vec<u8>>,
        respond_to: mpsc::Sender<CalendarResult<ExportedCalendar>>,
    },
    Shutdown,
}

/// Handle for communicating with the dashboard actor
#[derive(Clone)]
pub struct DashboardActorHandle {
    command_tx: mpsc::Sender<DashboardCommand>,
    loading_rx: watch::Receiver<bool>,
}

impl DashboardActorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(mpsc::Sender<T>) -> DashboardCommand,
    ) -> CalendarResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| other_error("Response channel closed"))
    }

    /// Whether the active range is still waiting for its events
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }

    pub async fn navigate(&self, step: Navigation) -> CalendarResult<CalendarGrid> {
        self.request(|tx| DashboardCommand::Navigate(step, tx)).await
    }

    pub async fn grid(&self) -> CalendarResult<CalendarGrid> {
        self.request(DashboardCommand::GetGrid).await
    }

    pub async fn drilldown(&self) -> CalendarResult<Option<Vec<CalendarEvent>>> {
        self.request(DashboardCommand::GetDrilldown).await
    }

    pub async fn status(&self) -> CalendarResult<DashboardStatus> {
        self.request(DashboardCommand::GetStatus).await
    }

    pub async fn take_notices(&self) -> CalendarResult<Vec<Notice>> {
        self.request(DashboardCommand::TakeNotices).await
    }

    pub async fn refresh(&self) -> CalendarResult<bool> {
        self.request(DashboardCommand::Refresh).await
    }

    pub async fn import_by_url(&self, url: String) -> CalendarResult<ImportSummary> {
        self.request(|tx| DashboardCommand::ImportUrl(url, tx)).await?
    }

    pub async fn import_by_file(&self, file: CalendarFile) -> CalendarResult<ImportSummary> {
        self.request(|tx| DashboardCommand::ImportFile(file, tx)).await?
    }

    pub async fn disconnect(&self) -> CalendarResult<()> {
        self.request(DashboardCommand::Disconnect).await?
    }

    pub async fn export(&self) -> CalendarResult<ExportedCalendar> {
        self.request(DashboardCommand::Export).await?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(DashboardCommand::Shutdown).await;
        Ok(())
    }
}

impl DashboardActor {
    /// Create a new actor and return its handle
    pub fn new(
        kind: DashboardKind,
        adapter: Arc<dyn SyncAdapter>,
        clock: Arc<dyn Clock>,
        view_mode: ViewMode,
    ) -> (Self, DashboardActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (loading_tx, loading_rx) = watch::channel(true);

        let actor = Self {
            session: CalendarSession::new(kind, clock.today(), view_mode),
            adapter,
            clock,
            command_rx,
            loading_tx,
            self_tx: command_tx.downgrade(),
        };

        let handle = DashboardActorHandle {
            command_tx,
            loading_rx,
        };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        let kind = self.session.kind().as_str();
        info!(dashboard = kind, "Calendar dashboard actor started");

        // Mount fetch for the initial range
        self.start_fetch();

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                DashboardCommand::Navigate(step, response_tx) => {
                    if let Some(range) = self.session.navigate(step, self.clock.today()) {
                        self.spawn_fetch(range);
                    }
                    self.publish_loading();
                    let _ = response_tx.send(self.session.grid(self.clock.today())).await;
                }
                DashboardCommand::GetGrid(response_tx) => {
                    let _ = response_tx.send(self.session.grid(self.clock.today())).await;
                }
                DashboardCommand::GetDrilldown(response_tx) => {
                    let _ = response_tx.send(self.session.drilldown()).await;
                }
                DashboardCommand::GetStatus(response_tx) => {
                    let _ = response_tx.send(self.session.status()).await;
                }
                DashboardCommand::TakeNotices(response_tx) => {
                    let _ = response_tx.send(self.session.take_notices()).await;
                }
                DashboardCommand::Refresh(response_tx) => {
                    let started = self.start_fetch();
                    let _ = response_tx.send(started).await;
                }
                DashboardCommand::ImportUrl(url, respond_to) => {
                    let adapter = Arc::clone(&self.adapter);
                    self.spawn(async move {
                        let result = adapter.import_by_url(&url).await;
                        DashboardCommand::ImportCompleted {
                            name: url,
                            result,
                            respond_to,
                        }
                    });
                }
                DashboardCommand::ImportFile(file, respond_to) => {
                    let adapter = Arc::clone(&self.adapter);
                    self.spawn(async move {
                        let name = file.display_name.clone();
                        let result = adapter.import_by_file(file).await;
                        DashboardCommand::ImportCompleted {
                            name,
                            result,
                            respond_to,
                        }
                    });
                }
                DashboardCommand::Disconnect(respond_to) => {
                    let adapter = Arc::clone(&self.adapter);
                    self.spawn(async move {
                        let result = adapter.disconnect().await;
                        DashboardCommand::DisconnectCompleted { result, respond_to }
                    });
                }
                DashboardCommand::Export(respond_to) => {
                    let adapter = Arc::clone(&self.adapter);
                    self.spawn(async move {
                        let result = adapter.export_registered().await;
                        DashboardCommand::ExportCompleted { result, respond_to }
                    });
                }
                DashboardCommand::FetchCompleted { range, result } => {
                    let outcome = self.session.apply_fetch(range, result);
                    self.publish_loading();
                    debug!(dashboard = kind, %range, ?outcome, "Calendar fetch completed");
                }
                DashboardCommand::ImportCompleted {
                    name,
                    result,
                    respond_to,
                } => {
                    self.session.record_import(&name, &result);
                    let _ = respond_to.send(result).await;
                }
                DashboardCommand::DisconnectCompleted { result, respond_to } => {
                    self.session.record_disconnect(&result);
                    let _ = respond_to.send(result).await;
                }
                DashboardCommand::ExportCompleted { result, respond_to } => {
                    let exported = self.session.export_file(result, self.clock.today());
                    let _ = respond_to.send(exported).await;
                }
                DashboardCommand::Shutdown => {
                    info!(dashboard = kind, "Calendar dashboard actor shutting down");
                    break;
                }
            }
        }

        info!(dashboard = kind, "Calendar dashboard actor shut down");
    }

    fn publish_loading(&self) {
        let loading = self.session.is_loading();
        self.loading_tx.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }

    /// Fetch the active range unless that fetch is already running
    fn start_fetch(&mut self) -> bool {
        match self.session.request_fetch() {
            Some(range) => {
                self.spawn_fetch(range);
                true
            }
            None => false,
        }
    }

    fn spawn_fetch(&self, range: QueryRange) {
        let adapter = Arc::clone(&self.adapter);
        self.spawn(async move {
            let result = adapter.fetch_range(range).await;
            DashboardCommand::FetchCompleted { range, result }
        });
    }

    /// Run adapter work off the actor loop and post its completion back
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = DashboardCommand> + Send + 'static,
    {
        let Some(command_tx) = self.self_tx.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let completion = task.await;
            let _ = command_tx.send(completion).await;
        });
    }
}
