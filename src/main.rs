mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Club-Hub calendar host");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the dashboards
    startup::start_host(config).await
}
