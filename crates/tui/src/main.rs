mod app;
mod block_font;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Arc,
};

use dayboard_core::{
    clock::resolve_locale,
    config::{self, AppConfig},
    Dashboard, DashboardServices, FileSessionStore, SystemTimeSource,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    if config.weather_api_key.is_none() {
        info!("No weather API key configured; weather stays hidden");
    }

    let services = DashboardServices::from_config(&config);
    let session = Arc::new(FileSessionStore::new(config.session_file()));
    let locale = resolve_locale(config.locale.as_deref());

    let dashboard = Dashboard::mount(services, session, Arc::new(SystemTimeSource), locale);
    let mut app = app::DayboardApp::new(dashboard);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("dayboard.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // File only: anything on stdout would land in the alternate screen.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
