use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

mod app;
mod ui;

use app::{App, AppEvent};
use trendboard::api::ApiClient;
use trendboard::chart::{chart_from_response, format_table, random_blue};
use trendboard::config::{self, Config, API_URL_ENV};
use trendboard::preferences::PreferenceManager;

#[derive(Parser, Debug)]
#[command(
    name = "trendboard",
    about = "Terminal dashboard for trending GitHub, Reddit, news, football and YouTube content"
)]
struct Args {
    /// Backend origin, e.g. http://127.0.0.1:5000 (overrides TRENDBOARD_API_URL and config)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Path to config.toml (default: ~/.config/trendboard/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Country for the YouTube trending list
    #[arg(long, value_name = "NAME")]
    country: Option<String>,

    /// Print the global trends table and exit
    #[arg(long)]
    print_trends: bool,
}

/// Create the config directory with user-only permissions.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).with_context(|| {
            format!("Failed to create config directory {}", config_dir.display())
        })?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    eprintln!(
                        "Warning: could not restrict permissions on {}: {}",
                        config_dir.display(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not read metadata of {}: {}",
                    config_dir.display(),
                    e
                );
            }
        }
    }
    Ok(())
}

/// Route tracing output. The TUI owns the terminal, so interactive runs log to
/// a file; one-shot commands log to stderr.
fn init_logging(config_dir: &Path, to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let log_path = config_dir.join("trendboard.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = config::config_dir()?;
    ensure_config_dir(&config_dir)?;
    init_logging(&config_dir, args.print_trends)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let env_url = std::env::var(API_URL_ENV).ok();
    let api_url = config.resolve_api_url(args.api_url.as_deref(), env_url.as_deref());
    let client = ApiClient::new(&api_url, config.request_timeout())
        .with_context(|| format!("Invalid backend URL '{}'", api_url))?
        .with_backoff(config.login_backoff());
    tracing::info!(origin = %client.origin(), "Using backend");

    if args.print_trends {
        let chart = chart_from_response(client.global_trends().await, random_blue)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        print!("{}", format_table(&chart));
        return Ok(());
    }

    let prefs = PreferenceManager::load(&config, &config_dir.join("prefs.toml"));
    let country = args
        .country
        .clone()
        .unwrap_or_else(|| config.youtube_country.clone());

    let mut app = App::new(client, country, prefs);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
