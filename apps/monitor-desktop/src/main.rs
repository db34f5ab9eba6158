//! regwatch desktop monitor entry point.

mod app;
mod cli;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting regwatch monitor"
    );

    // Load settings.
    let path = match args.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let settings = config::Settings::load_or_create(&path)?;
    tracing::info!(
        path = %path.display(),
        device = %settings.device_name,
        addr = %format!("{}:{}", settings.ip_address, settings.port),
        "settings loaded"
    );

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;

    if args.test_connection {
        let reachable = rt.block_on(app::test_connection(&settings))?;
        return Ok(if reachable {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    rt.block_on(app::run(settings, path))?;

    tracing::info!("monitor shut down cleanly");
    Ok(ExitCode::SUCCESS)
}
