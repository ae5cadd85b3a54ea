use crate::shutdown;
use clubhub_calendar::components::dashboard::render::render_grid;
use clubhub_calendar::components::{CalendarDashboard, ComponentManager, DashboardKind};
use clubhub_calendar::config::Config;
use clubhub_calendar::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How long the host waits for each dashboard's first grid
const INITIAL_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Start both dashboards and run until a shutdown signal arrives
pub async fn start_host(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(CalendarDashboard::new(DashboardKind::Participant));
    component_manager.register(CalendarDashboard::new(DashboardKind::University));
    let component_manager = Arc::new(component_manager);

    component_manager.init_all().await?;

    let (shutdown_send, shutdown_recv) = oneshot::channel();
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    let export_dir = config.read().await.export_dir.clone();
    for handle in component_manager.dashboard_handles().await {
        let kind = handle.kind().as_str();
        match handle.wait_until_loaded(INITIAL_LOAD_TIMEOUT).await {
            Ok(grid) => info!(dashboard = kind, "Initial calendar:\n{}", render_grid(&grid)),
            Err(e) => warn!(dashboard = kind, "Initial calendar not available: {}", e),
        }

        if handle.kind() == DashboardKind::Participant {
            match handle.export_to(&export_dir).await {
                Ok(path) => info!(dashboard = kind, path = %path.display(), "Exported registered events"),
                Err(e) => warn!(dashboard = kind, "Export failed: {}", e),
            }
        }
    }

    info!("Calendar host running");
    let _ = shutdown_recv.await;
    info!("Received shutdown signal, calendar host stopped");
    Ok(())
}
