//! TOML-backed configuration (spec §4.1-§4.8 defaults). No global/static
//! state: callers load a [`Config`] once and thread it through explicitly.

use crate::cache::CachePerms;
use crate::fetch::FetchClientConfig;
use crate::orchestrator::RunBudget;
use crate::robots::RobotsManagerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub strict_perms: bool,
    pub max_age_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            strict_perms: true,
            max_age_secs: 7 * 24 * 60 * 60,
            max_entries: 10_000,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("webresearch")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub user_agent: String,
    pub memory_ttl_secs: u64,
    pub allow_private_hosts: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        let defaults = RobotsManagerConfig::default();
        Self {
            user_agent: defaults.user_agent,
            memory_ttl_secs: defaults.memory_ttl.as_secs(),
            allow_private_hosts: defaults.allow_private_hosts,
        }
    }
}

impl RobotsConfig {
    pub fn to_manager_config(&self) -> RobotsManagerConfig {
        RobotsManagerConfig {
            user_agent: self.user_agent.clone(),
            memory_ttl: Duration::from_secs(self.memory_ttl_secs),
            allow_private_hosts: self.allow_private_hosts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub max_attempts: u32,
    pub per_request_timeout_secs: u64,
    pub max_concurrent: usize,
    pub redirect_max_hops: usize,
    pub bypass_cache: bool,
    pub allow_private_hosts: bool,
    pub enable_pdf: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchClientConfig::default();
        Self {
            user_agent: defaults.user_agent,
            max_attempts: defaults.max_attempts,
            per_request_timeout_secs: defaults.per_request_timeout.as_secs(),
            max_concurrent: defaults.max_concurrent,
            redirect_max_hops: defaults.redirect_max_hops,
            bypass_cache: defaults.bypass_cache,
            allow_private_hosts: defaults.allow_private_hosts,
            enable_pdf: defaults.enable_pdf,
        }
    }
}

impl FetchConfig {
    pub fn to_client_config(&self) -> FetchClientConfig {
        FetchClientConfig {
            user_agent: self.user_agent.clone(),
            max_attempts: self.max_attempts,
            per_request_timeout: Duration::from_secs(self.per_request_timeout_secs),
            max_concurrent: self.max_concurrent,
            redirect_max_hops: self.redirect_max_hops,
            bypass_cache: self.bypass_cache,
            allow_private_hosts: self.allow_private_hosts,
            enable_pdf: self.enable_pdf,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub wall_clock_secs: u64,
    pub per_tool_timeout_secs: u64,
    pub max_tool_calls: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let defaults = RunBudget::default();
        Self {
            wall_clock_secs: defaults.wall_clock.as_secs(),
            per_tool_timeout_secs: defaults.per_tool_timeout.as_secs(),
            max_tool_calls: defaults.max_tool_calls,
        }
    }
}

impl OrchestratorConfig {
    pub fn to_run_budget(&self) -> RunBudget {
        RunBudget {
            wall_clock: Duration::from_secs(self.wall_clock_secs),
            per_tool_timeout: Duration::from_secs(self.per_tool_timeout_secs),
            max_tool_calls: self.max_tool_calls,
        }
    }
}

/// Log output format (spec's ambient logging section). Selectable from
/// config (`log_format = "json"`) or overridden with `--log-format` on the
/// CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub robots: RobotsConfig,
    pub fetch: FetchConfig,
    pub orchestrator: OrchestratorConfig,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from a TOML file; returns defaults if the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn cache_perms(&self) -> CachePerms {
        CachePerms {
            strict: self.cache.strict_perms,
        }
    }
}
