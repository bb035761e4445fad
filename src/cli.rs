//! Thin command surface over the fetch/robots/cache building blocks, mostly
//! useful for manual inspection (`webresearch fetch <url>`). The orchestrator
//! and tool registry are embedding concerns and are exercised via the
//! library API, not the CLI.

use crate::cache::HttpCache;
use crate::config::{Config, LogFormat};
use crate::fetch::FetchClient;
use crate::robots::RobotsManager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "webresearch")]
#[command(about = "Polite web-fetch and tool-orchestration substrate")]
pub struct Cli {
    /// Path to a TOML config file. Defaults are used if it does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single URL through the robots-aware, cached client.
    Fetch {
        url: String,
        /// Skip the cache for this request.
        #[arg(long)]
        no_cache: bool,
    },
    /// Check whether a URL is allowed by the target host's robots.txt.
    Robots { url: String },
    /// Print the resolved configuration as TOML.
    Config,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("webresearch.toml"));
    let config = Config::load(&config_path).context("loading configuration")?;

    init_tracing(cli.log_format.unwrap_or(config.log_format));

    match cli.command {
        Commands::Fetch { url, no_cache } => fetch_command(&config, &url, no_cache).await,
        Commands::Robots { url } => robots_command(&config, &url).await,
        Commands::Config => config_command(&config),
    }
}

/// Install the global `tracing` subscriber. `--log-format json` (or
/// `log_format = "json"` in config) switches to newline-delimited JSON
/// events for log aggregators; the default is human-readable text.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,webresearch=debug".parse().unwrap());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn fetch_command(config: &Config, url: &str, no_cache: bool) -> Result<()> {
    let cache = Arc::new(HttpCache::with_perms(&config.cache.dir, config.cache_perms())?);
    let robots = Arc::new(RobotsManager::new(
        config.robots.to_manager_config(),
        Some(cache.clone()),
    ));

    let mut client_config = config.fetch.to_client_config();
    client_config.bypass_cache = client_config.bypass_cache || no_cache;

    let client = FetchClient::new(client_config, Some(cache), Some(robots));
    let result = client.get(url).await?;

    info!(
        url,
        final_url = %result.final_url,
        content_type = %result.content_type,
        bytes = result.body.len(),
        from_cache = result.from_cache,
        "fetch complete"
    );
    println!("{} -> {} ({} bytes, from_cache={})", url, result.final_url, result.body.len(), result.from_cache);
    Ok(())
}

async fn robots_command(config: &Config, url: &str) -> Result<()> {
    let robots = RobotsManager::new(config.robots.to_manager_config(), None);
    let parsed = url::Url::parse(url).context("parsing URL")?;
    let (rules, source) = robots.get(url).await?;
    let path = parsed[url::Position::BeforePath..].to_string();
    let allowed = rules.is_allowed(&config.robots.user_agent, &path);
    println!("{} [{:?}]: allowed={}", url, source, allowed);
    Ok(())
}

fn config_command(config: &Config) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
