use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod board;
mod config;
mod dashboard;
mod live_scores;
mod models;
mod notify;

use board::LiveBoard;
use config::Config;
use dashboard::AppState;
use live_scores::{sports, BetsApi, Poller};
use notify::{ConsoleSink, LogSink, NotificationSink, Notifier, TelegramSink};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialise tracing / logging; the guard flushes the file writer on exit
    let _log_guard = init_tracing(&config)?;
    config.validate()?;

    let base_url = config.api_base_url()?;
    let provider = Arc::new(BetsApi::new(
        base_url.as_str(),
        &config.api_key,
        config.request_timeout(),
    )?);
    info!("In-play API: {}", base_url);

    // Sinks: structured log always, console and Telegram when configured
    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    if config.console {
        sinks.push(Arc::new(ConsoleSink));
    }
    if let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, &config.telegram_chat_id) {
        sinks.push(Arc::new(TelegramSink::new(
            &config.telegram_api_url,
            token,
            chat_id,
            config.request_timeout(),
        )?));
        info!("Telegram notifications enabled for chat {}", chat_id);
    }
    let notifier = Notifier::new(sinks);

    let board = LiveBoard::new(config.degraded_after_cycles);
    let mut poller = Poller::new(config.poller_config(), provider, notifier, board.clone());

    if config.once {
        let report = poller.poll_cycle().await;
        for (sport_id, matches) in &report.matches_by_sport {
            info!(
                "{} {}: {} live matches",
                sports::emoji_for(*sport_id),
                sports::name_for(*sport_id),
                matches.len()
            );
        }
        for sport_id in &report.failed_sports {
            warn!("{}: fetch failed", sports::name_for(*sport_id));
        }
        info!(
            "Single cycle finished: {} matches, {} notifications",
            report.total_matches(),
            report.notifications
        );
        return Ok(());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
            cancel.cancel();
        });
    }

    let poller_handle = poller.spawn(cancel.clone());

    // Start the read-only HTTP surface
    let app = dashboard::router(AppState { board });
    let addr: SocketAddr = config
        .dashboard_addr
        .parse()
        .with_context(|| format!("invalid DASHBOARD_ADDR '{}'", config.dashboard_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);

    // Run dashboard server (blocks until shutdown)
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await?;

    if let Err(e) = poller_handle.await {
        error!("Poller task ended abnormally: {}", e);
    }
    Ok(())
}

/// stdout plus, unless disabled, a daily-rotated file under `LOG_DIR`.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match config.log_file_dir() {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("inplay-monitor")
                .filename_suffix("log")
                .build(dir)
                .with_context(|| format!("cannot open log file in {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(dir) = config.log_file_dir() {
        info!("Writing daily log files to {}", dir.display());
    }
    Ok(guard)
}
