//! Fetch/cache/evaluate `robots.txt` (spec §4.3).

use crate::cache::HttpCache;
use crate::robots::rules::{disallow_all, RobotsRules};
use crate::utils::clock::{default_clock, Clock};
use crate::utils::http::{default_http_client, limited_body, DEFAULT_MAX_BODY_BYTES};
use crate::utils::url_security::{is_private_host, validate_scheme_and_userinfo};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;


/// Where a ruleset came from, for observability and the testable-property
/// assertions in spec §8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    Network,
    Memory,
    Cache304,
}

struct MemoryEntry {
    rules: RobotsRules,
    expiry_utc: DateTime<Utc>,
}

pub struct RobotsManagerConfig {
    pub user_agent: String,
    pub memory_ttl: Duration,
    pub allow_private_hosts: bool,
}

impl Default for RobotsManagerConfig {
    fn default() -> Self {
        Self {
            user_agent: "webresearch/0.1".to_string(),
            memory_ttl: Duration::from_secs(30 * 60),
            allow_private_hosts: false,
        }
    }
}

pub struct RobotsManager {
    config: RobotsManagerConfig,
    cache: Option<Arc<HttpCache>>,
    client: Client,
    memory: Mutex<HashMap<String, MemoryEntry>>,
    clock: Arc<dyn Clock>,
}

fn robots_url(scheme: &str, host: &str, port: Option<u16>) -> String {
    match port {
        Some(p) => format!("{scheme}://{host}:{p}/robots.txt"),
        None => format!("{scheme}://{host}/robots.txt"),
    }
}

impl RobotsManager {
    pub fn new(config: RobotsManagerConfig, cache: Option<Arc<HttpCache>>) -> Self {
        Self::with_clock(config, cache, default_clock())
    }

    pub fn with_clock(
        config: RobotsManagerConfig,
        cache: Option<Arc<HttpCache>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            cache,
            client: default_http_client(),
            memory: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Get the effective rules for the given URL's origin, and the source
    /// the rules were served from.
    pub async fn get(&self, url: &str) -> crate::errors::Result<(RobotsRules, SourceTag)> {
        let parsed = Url::parse(url).map_err(|e| crate::errors::Error::Protocol(e.to_string()))?;
        validate_scheme_and_userinfo(&parsed).map_err(crate::errors::Error::Policy)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| crate::errors::Error::Protocol("URL has no host".to_string()))?;
        if !self.config.allow_private_hosts {
            let host_ref = parsed.host().expect("host checked above");
            if is_private_host(&host_ref) {
                return Err(crate::errors::Error::policy(format!(
                    "host '{host}' is not public"
                )));
            }
        }

        let origin_key = robots_url(parsed.scheme(), host, parsed.port());

        if let Some(rules) = self.memory_lookup(&origin_key) {
            return Ok((rules, SourceTag::Memory));
        }

        self.fetch_and_memoize(&origin_key).await
    }

    fn memory_lookup(&self, origin_key: &str) -> Option<RobotsRules> {
        let now = self.clock.now();
        let memory = self.memory.lock().expect("robots memory mutex poisoned");
        memory.get(origin_key).and_then(|entry| {
            if entry.expiry_utc > now {
                Some(entry.rules.clone())
            } else {
                None
            }
        })
    }

    fn memoize(&self, origin_key: &str, rules: RobotsRules) {
        let expiry_utc = self.clock.now()
            + chrono::Duration::from_std(self.config.memory_ttl).unwrap_or_default();
        let mut memory = self.memory.lock().expect("robots memory mutex poisoned");
        memory.insert(origin_key.to_string(), MemoryEntry { rules, expiry_utc });
    }

    async fn fetch_and_memoize(
        &self,
        origin_key: &str,
    ) -> crate::errors::Result<(RobotsRules, SourceTag)> {
        let cached_meta = self.cache.as_ref().and_then(|c| c.load_meta(origin_key));

        let mut req = self
            .client
            .get(origin_key)
            .header("User-Agent", &self.config.user_agent);
        if let Some(meta) = &cached_meta {
            if let Some(etag) = &meta.etag {
                req = req.header("If-None-Match", etag);
            }
            if let Some(lm) = &meta.last_modified {
                req = req.header("If-Modified-Since", lm);
            }
        }

        let response = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%e, origin_key, "robots.txt fetch failed, memoizing disallow-all");
                let rules = disallow_all();
                self.memoize(origin_key, rules.clone());
                return Ok((rules, SourceTag::Network));
            }
        };

        let status = response.status();

        if status.as_u16() == 304 {
            if let Some(cache) = &self.cache {
                if let Some(body) = cache.load_body(origin_key) {
                    let text = String::from_utf8_lossy(&body).into_owned();
                    let rules = RobotsRules::parse(&text);
                    self.memoize(origin_key, rules.clone());
                    return Ok((rules, SourceTag::Cache304));
                }
            }
            // 304 with nothing on disk: fall through to conservative failure.
            warn!(origin_key, "304 with no cached body, memoizing disallow-all");
            let rules = disallow_all();
            self.memoize(origin_key, rules.clone());
            return Ok((rules, SourceTag::Network));
        }

        if status.is_success() {
            let etag = response
                .headers()
                .get("etag")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string);
            let last_modified = response
                .headers()
                .get("last-modified")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string);

            let (bytes, _truncated) = limited_body(response, DEFAULT_MAX_BODY_BYTES)
                .await
                .map_err(crate::errors::Error::Internal)?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let rules = RobotsRules::parse(&text);

            if let Some(cache) = &self.cache {
                let _ = cache.save(origin_key, "text/plain", etag, last_modified, &bytes);
            }

            self.memoize(origin_key, rules.clone());
            return Ok((rules, SourceTag::Network));
        }

        if status.as_u16() == 404 {
            debug!(origin_key, "robots.txt 404, memoizing allow-all");
            let rules = RobotsRules::default();
            self.memoize(origin_key, rules.clone());
            return Ok((rules, SourceTag::Network));
        }

        // 5xx, 401, 403: deliberate conservatism, memoize disallow-all.
        warn!(
            origin_key,
            status = status.as_u16(),
            "robots.txt fetch returned policy/server error, memoizing disallow-all"
        );
        let rules = disallow_all();
        self.memoize(origin_key, rules.clone());
        Ok((rules, SourceTag::Network))
    }
}
