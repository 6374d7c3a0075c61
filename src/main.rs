use std::error::Error;
use std::path::{Path, PathBuf};
use clap::Parser;
use tracing::info;

mod config;
mod server;
mod summarizer;

use config::Settings;

/// Meeting transcript summarization service
#[derive(Parser, Debug)]
#[command(name = "briefer", about = "HTTP service that summarizes meeting transcripts")]
struct Cli {
    /// Directory holding default.toml / local.toml (defaults to ./config)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Override the configured bind host
    #[arg(long)]
    host: Option<String>,
    /// Override the configured bind port
    #[arg(long)]
    port: Option<u16>,
}

/// Main entry point for the briefer service
///
/// Loads settings, initializes logging, walks the model fallback chain,
/// and serves the HTTP API. If no model in the chain loads, startup
/// aborts with an error.
///
/// # Errors
/// Returns an error if configuration loading, model loading, or server
/// binding fails
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first
    let mut settings = Settings::new(cli.config_dir.as_deref())?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    // Initialize the subscriber first, before any file operations
    let log_dir = settings
        .logging
        .directory
        .clone()
        .unwrap_or_else(|| Path::new("logs").to_path_buf());
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        &log_dir,
        "briefer",
    );

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let level: tracing::Level = settings
        .logging
        .level
        .parse()
        .map_err(|e| format!("Invalid logging level '{}': {}", settings.logging.level, e))?;

    tracing_subscriber::fmt()
        // Write to both console and file
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_max_level(level)
        .init();

    info!("Briefer starting up...");

    std::fs::create_dir_all(&log_dir)?;
    let full_log_path = std::fs::canonicalize(&log_dir)?;
    info!("Log directory: {}", full_log_path.display());

    // Models directory location
    let models_path = std::fs::canonicalize(&settings.models.directory)?;
    info!("Models directory: {}", models_path.display());

    info!("Settings loaded");

    // Walk the fallback chain; aborts startup if every candidate fails
    let loaded = summarizer::load_first_available(&settings)?;
    let engine = summarizer::SummaryEngine::new(loaded, settings.clone());

    let status = engine.status();
    info!("Model status:");
    info!("  - Fine-tuned: {}", if status.primary_loaded { "loaded" } else { "failed" });
    info!("  - Fallback: {}", if status.fallback_loaded { "loaded" } else { "not in use" });
    info!("  - Current model: {}", status.current_model);
    info!("  - Device: {}", status.device);

    // Create and start server
    let server = server::ApiServer::new(engine, settings.server.host.clone(), settings.server.port);
    server.start().await?;

    Ok(())
}
