//! Voicemap client entry point.
//!
//! Wires the recognition-service transport, the console controls and the
//! headless map into one [`EventLoop`], then runs it until `:quit` or Ctrl+C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()                 -- config.toml, CLI overrides
//!  └─ run_transport()   ─┐          -- WebSocket reconnect loop
//!  └─ run_console()     ─┼─► ClientEvent queue ─► EventLoop::run()
//!  └─ ctrl_c handler    ─┘                          ├─ CommandDispatcher
//!                                                   ├─ ControlSurface
//!                                                   └─ ConnectivityIndicator
//! ```
//!
//! # Usage
//!
//! ```text
//! voicemap [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Config file [default: platform config dir]
//!   --server <URL>         Recognition service WebSocket URL
//!   --log-level <FILTER>   Log filter when RUST_LOG is unset
//!   --history-file <PATH>  History file [default: platform data dir]
//!   --ephemeral            Keep history in memory only
//!   --init-config          Write a default config file and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voicemap_core::{ConnectivityIndicator, Grammar, HistoryStore, MemoryStore, SystemClock};

use voicemap_client::application::control_surface::ControlSurface;
use voicemap_client::application::dispatch_command::CommandDispatcher;
use voicemap_client::application::event_loop::{ClientEvent, EventLoop};
use voicemap_client::infrastructure::{
    console::{run_console, USAGE},
    gazetteer::Gazetteer,
    map::HeadlessMap,
    storage::{
        config::{config_file_path, load_config, save_config, AppConfig},
        default_history_path,
        kv_store::JsonFileStore,
    },
    transport::{outbound_channel, run_transport},
    ui::ConsoleSurface,
};

/// Pending `start_recognition` requests; more than a few means the service
/// is not keeping up and further requests add nothing.
const OUTBOUND_CAPACITY: usize = 4;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Voice-driven map control client.
#[derive(Debug, Parser)]
#[command(
    name = "voicemap",
    about = "Applies spoken map commands from a recognition service to a map view",
    version
)]
struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, env = "VOICEMAP_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the recognition service.  Overrides the config file.
    #[arg(long, env = "VOICEMAP_SERVER")]
    server: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.  Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// History file.  Overrides the config file.
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Keep navigation history in memory only.
    #[arg(long, conflicts_with = "history_file")]
    ephemeral: bool,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(config_file_path()?),
        }
    }

    /// Folds command-line overrides into `config`.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            config.transport.server_url = server.clone();
        }
        if let Some(level) = &self.log_level {
            config.client.log_level = level.clone();
        }
        if let Some(path) = &self.history_file {
            config.client.history_file = Some(path.clone());
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path()?;

    if cli.init_config {
        save_config(&config_path, &AppConfig::default())
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!("wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let mut config = load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    cli.apply_overrides(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to start the Tokio runtime")?;
    let result = runtime.block_on(run(config, cli.ephemeral));
    // The console reader may be parked in a blocking stdin read.
    runtime.shutdown_background();
    result
}

async fn run(config: AppConfig, ephemeral: bool) -> anyhow::Result<()> {
    info!(
        "voicemap starting; recognition service at {}",
        config.transport.server_url
    );

    // ── Map, history and dispatcher ───────────────────────────────────────────
    let map_cfg = &config.map;
    let map = HeadlessMap::new(
        map_cfg.initial_center(),
        map_cfg.initial_zoom,
        map_cfg.min_zoom,
        map_cfg.max_zoom,
    );
    let history = open_history(&config, ephemeral)?;
    let dispatcher = CommandDispatcher::new(Box::new(map), history, map_cfg.dispatch_settings());

    // ── Controls and event loop ───────────────────────────────────────────────
    let (peer, outbox) = outbound_channel(OUTBOUND_CAPACITY);
    let surface = ControlSurface::new(Box::new(ConsoleSurface::stdout()), Arc::new(peer));
    let indicator = ConnectivityIndicator::new(config.indicator.timings());
    let (event_loop, events) = EventLoop::new(
        dispatcher,
        surface,
        indicator,
        config.transport.queue_capacity.max(1),
    );

    // ── Producers ─────────────────────────────────────────────────────────────
    let transport = tokio::spawn(run_transport(
        config.transport.server_url.clone(),
        config.transport.reconnect_delay(),
        events.clone(),
        outbox,
    ));

    let grammar = Grammar::new().context("failed to compile the command grammar")?;
    let gazetteer = Gazetteer::from_entries(&config.places);
    info!("{} known places; {USAGE}", gazetteer.len());
    let console_events = events.clone();
    let console = tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        if let Err(e) = run_console(stdin, console_events, grammar, Box::new(gazetteer)).await {
            error!("console reader stopped: {e:#}");
        }
    });

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                let _ = events.send(ClientEvent::Shutdown).await;
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── Main loop ─────────────────────────────────────────────────────────────
    let event_loop = event_loop.run().await;
    transport.abort();
    console.abort();

    info!(
        history_entries = event_loop.dispatcher().history().len(),
        "voicemap stopped"
    );
    Ok(())
}

fn open_history(config: &AppConfig, ephemeral: bool) -> anyhow::Result<HistoryStore> {
    if ephemeral {
        info!("history kept in memory only");
        return Ok(HistoryStore::load(
            Box::new(MemoryStore::new()),
            Box::new(SystemClock),
        ));
    }
    let path = match &config.client.history_file {
        Some(path) => path.clone(),
        None => default_history_path()
            .context("no platform data directory; pass --history-file or --ephemeral")?,
    };
    info!("history file: {}", path.display());
    Ok(HistoryStore::load(
        Box::new(JsonFileStore::new(path)),
        Box::new(SystemClock),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
