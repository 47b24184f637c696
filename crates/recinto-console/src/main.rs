use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{watch, RwLock};

use recinto_console::{console, logging, ConsoleConfig, Overrides};
use recinto_overlay::SeatingPanel;
use recinto_poll::{HttpStateSource, PollDriver, PollStatus};

/// Seating panel of the legislative moderation console.
#[derive(Parser, Debug)]
#[command(name = "recinto-console", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:8000
    #[arg(long)]
    base_url: Option<String>,

    /// Delay between poll ticks, in milliseconds.
    #[arg(long = "poll-ms")]
    poll_ms: Option<u64>,

    /// Log panel changes to stderr instead of drawing the terminal UI.
    #[arg(long)]
    headless: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&Overrides {
        base_url: cli.base_url.clone(),
        poll_interval_ms: cli.poll_ms,
        log_level: cli.log_level.clone(),
    })?;

    let log_target = logging::init(&config.logging, cli.headless)?;
    tracing::info!(
        backend = %config.backend.base_url,
        poll_ms = config.backend.poll_interval_ms,
        log = ?log_target,
        "Recinto console starting"
    );

    let source = HttpStateSource::new(
        &config.backend.base_url,
        &config.backend.state_endpoint,
        config.fetch_timeout(),
    )
    .context("cannot set up the state source")?;
    tracing::debug!(url = source.url(), timeout = ?source.timeout(), "State source ready");

    let panel = Arc::new(RwLock::new(SeatingPanel::new(config.overlay_config())));
    let mut driver = PollDriver::new(config.poll_config(), source);
    driver.add_sink(panel.clone());
    let status = driver.subscribe();

    let (stop_tx, stop_rx) = watch::channel(false);
    let poller = tokio::spawn(driver.run(stop_rx));

    let outcome = if cli.headless {
        run_headless(panel, status).await
    } else {
        console::run_console(panel, status, config.seating.cell_gap).await
    };

    let _ = stop_tx.send(true);
    poller.await.context("poll driver task failed")?;
    outcome
}

/// Log the session header whenever it changes, until Ctrl+C.
async fn run_headless(
    panel: Arc<RwLock<SeatingPanel>>,
    mut status: watch::Receiver<PollStatus>,
) -> anyhow::Result<()> {
    let mut last_header: Option<String> = None;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("cannot listen for Ctrl+C")?;
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let header = panel.read().await.header().map(ToString::to_string);
                if header != last_header {
                    match &header {
                        Some(h) => tracing::info!(header = %h, "Session header"),
                        None => tracing::info!("No open session"),
                    }
                    last_header = header;
                }
            }
        }
    }
}
