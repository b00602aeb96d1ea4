//! `entman-tui`: terminal front end for the Home Assistant entity manager.
//!
//! Two screens reachable with `1`/`2` or Tab: Entities (filter, select,
//! bulk actions, recorder report) and Domains (per-domain recorder
//! coverage). The panel's watch channels are bridged into the action loop
//! so every reload repaints the active screen.
//!
//! Logs go to a file (default `<data dir>/entman-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use entman_core::{Panel, PanelConfig};

use crate::app::App;

/// Terminal UI for bulk-managing Home Assistant entities.
#[derive(Parser, Debug)]
#[command(name = "entman-tui", version, about)]
struct Cli {
    /// Profile from the config file
    #[arg(short = 'p', long, env = "ENTMAN_PROFILE")]
    profile: Option<String>,

    /// Home Assistant URL, bypassing the config file
    #[arg(short = 'u', long, env = "ENTMAN_URL")]
    url: Option<String>,

    /// Long-lived access token (used with --url)
    #[arg(long, env = "ENTMAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Directory for exported entity lists
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Log file path (defaults to entman-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Nothing may reach stdout/stderr while the TUI owns
/// the terminal. The guard must live until exit so logs flush.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "entman_tui={log_level},entman_core={log_level},entman_api={log_level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| entman_config::data_dir().join("entman-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    std::fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("cannot create log directory {}", log_dir.display()))?;
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("entman-tui.log"));

    let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}

/// CLI flags first, then the config file profile.
fn build_panel_config(cli: &Cli) -> Result<PanelConfig> {
    if let Some(raw) = cli.url.as_deref() {
        let token = cli
            .token
            .clone()
            .ok_or_else(|| eyre!("--url needs a token (--token or ENTMAN_TOKEN)"))?;
        let url = entman_config::parse_url(raw)?;
        let mut config = PanelConfig::new(url, SecretString::from(token));
        config.tls = entman_config::tls_for(cli.insecure, None);
        return Ok(config);
    }

    let cfg = entman_config::load_config()?;
    let (name, profile) = cfg.profile(cli.profile.as_deref()).wrap_err_with(|| {
        format!(
            "no usable profile in {}; run `entman config init` or pass --url",
            entman_config::config_path().display()
        )
    })?;
    let mut config = entman_config::profile_to_panel_config(profile, name, &cfg.defaults)?;
    if cli.insecure {
        config.tls = entman_config::tls_for(true, None);
    }
    info!(profile = name, url = %config.url, "using config profile");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal enters raw mode.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli)?;
    info!("starting entman-tui");

    let config = build_panel_config(&cli)?;
    let mut app = App::new(Panel::new(config), cli.export_dir);
    app.run().await
}
