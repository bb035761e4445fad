//! Polite, bounded-concurrency HTTPS GET of public documents (spec §4.4).

use crate::cache::HttpCache;
use crate::errors::{Error, Result};
use crate::fetch::optout::detect_opt_out;
use crate::fetch::scheduler::Scheduler;
use crate::robots::RobotsManager;
use crate::utils::url_security::{is_private_host, validate_scheme_and_userinfo};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
mod tests;

const ACCEPTED_TEXT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];
const PDF_TYPE: &str = "application/pdf";

pub struct FetchClientConfig {
    pub user_agent: String,
    pub max_attempts: u32,
    pub per_request_timeout: Duration,
    /// 0 = unlimited.
    pub max_concurrent: usize,
    pub redirect_max_hops: usize,
    pub bypass_cache: bool,
    pub allow_private_hosts: bool,
    pub enable_pdf: bool,
}

impl Default for FetchClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "webresearch/0.1".to_string(),
            max_attempts: 3,
            per_request_timeout: Duration::from_secs(20),
            max_concurrent: 8,
            redirect_max_hops: 5,
            bypass_cache: false,
            allow_private_hosts: false,
            enable_pdf: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Vec<u8>,
    pub content_type: String,
    pub final_url: String,
    pub from_cache: bool,
}

pub struct FetchClient {
    config: FetchClientConfig,
    client: Client,
    semaphore: Option<Semaphore>,
    scheduler: Scheduler,
    cache: Option<Arc<HttpCache>>,
    robots: Option<Arc<RobotsManager>>,
}

/// Build a redirect-capped client. Policy rejects non-http(s) redirect
/// targets and caps the chain at `max_hops`; this is a fresh client (not a
/// shared global), so the policy's hop accounting never leaks across
/// unrelated callers.
fn build_client(max_hops: usize, timeout: Duration) -> Client {
    let policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= max_hops {
            return attempt.error("redirect limit exceeded");
        }
        let scheme = attempt.url().scheme().to_string();
        match scheme.as_str() {
            "http" | "https" => attempt.follow(),
            other => attempt.error(format!("redirect to unsupported scheme '{other}'")),
        }
    });
    Client::builder()
        .redirect(policy)
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl FetchClient {
    pub fn new(
        config: FetchClientConfig,
        cache: Option<Arc<HttpCache>>,
        robots: Option<Arc<RobotsManager>>,
    ) -> Self {
        let client = build_client(config.redirect_max_hops, config.per_request_timeout);
        let semaphore = if config.max_concurrent > 0 {
            Some(Semaphore::new(config.max_concurrent))
        } else {
            None
        };
        Self {
            config,
            client,
            semaphore,
            scheduler: Scheduler::new(),
            cache,
            robots,
        }
    }

    pub async fn get(&self, url_str: &str) -> Result<FetchResult> {
        let _permit = match &self.semaphore {
            Some(sem) => Some(sem.acquire().await.map_err(|e| Error::Internal(e.into()))?),
            None => None,
        };

        let url = Url::parse(url_str).map_err(|e| Error::Protocol(e.to_string()))?;
        validate_scheme_and_userinfo(&url).map_err(Error::policy)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Protocol("URL has no host".to_string()))?
            .to_string();

        if !self.config.allow_private_hosts {
            let host_ref = url.host().expect("host checked above");
            if is_private_host(&host_ref) {
                return Err(Error::policy(format!("host '{host}' is not public")));
            }
        }

        if let Some(robots) = &self.robots {
            let (rules, _source) = robots.get(url_str).await?;
            let path_and_query = path_and_query(&url);
            if !rules.is_allowed(&self.config.user_agent, &path_and_query) {
                return Err(Error::policy(format!(
                    "robots.txt disallows '{path_and_query}' for '{}'",
                    self.config.user_agent
                )));
            }
            if let Some(delay) = rules.crawl_delay_for(&self.config.user_agent) {
                let _ = self.scheduler.wait_for_slot(&host, delay, None).await;
            }
        }

        self.get_with_retries(url_str).await
    }

    async fn get_with_retries(&self, url_str: &str) -> Result<FetchResult> {
        let cached_meta = if self.config.bypass_cache {
            None
        } else {
            self.cache.as_ref().and_then(|c| c.load_meta(url_str))
        };

        let mut last_error: Option<Error> = None;
        for attempt in 1..=self.config.max_attempts {
            let mut req = self
                .client
                .get(url_str)
                .header("User-Agent", &self.config.user_agent);
            if let Some(meta) = &cached_meta {
                if let Some(etag) = &meta.etag {
                    req = req.header("If-None-Match", etag);
                }
                if let Some(lm) = &meta.last_modified {
                    req = req.header("If-Modified-Since", lm);
                }
            }

            match req.send().await {
                Ok(resp) => match self.handle_response(url_str, resp).await {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                        warn!(url = url_str, attempt, "transient fetch error, retrying");
                        last_error = Some(e);
                        tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                    }
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    let transient = e.is_timeout() || e.is_connect();
                    if transient && attempt < self.config.max_attempts {
                        warn!(url = url_str, attempt, %e, "transient network error, retrying");
                        last_error = Some(Error::network(e.to_string(), true));
                        tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                    } else {
                        return Err(Error::network(e.to_string(), transient));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::network("exhausted retry attempts", false)))
    }

    async fn handle_response(&self, url_str: &str, resp: reqwest::Response) -> Result<FetchResult> {
        let status = resp.status();
        let final_url = resp.url().to_string();

        if status.is_server_error() {
            return Err(Error::network(format!("server error {status}"), true));
        }

        if status == StatusCode::NOT_MODIFIED {
            if let Some(cache) = &self.cache {
                if let Some(body) = cache.load_body(url_str) {
                    let content_type = cache
                        .load_meta(url_str)
                        .map(|m| m.content_type)
                        .unwrap_or_default();
                    cache.touch(url_str);
                    return Ok(FetchResult {
                        body,
                        content_type,
                        final_url,
                        from_cache: true,
                    });
                }
            }
            return Err(Error::Protocol(
                "304 Not Modified with no cached body".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(Error::Protocol(format!("unexpected status {status}")));
        }

        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        let is_html = ACCEPTED_TEXT_TYPES.contains(&content_type.as_str());
        let is_pdf = content_type == PDF_TYPE;
        if !is_html && !(self.config.enable_pdf && is_pdf) {
            return Err(Error::Protocol(format!(
                "unsupported content-type '{content_type}'"
            )));
        }

        let headers = resp.headers().clone();
        let etag = headers
            .get("etag")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let last_modified = headers
            .get("last-modified")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let (bytes, _truncated) =
            crate::utils::http::limited_body(resp, crate::utils::http::DEFAULT_MAX_BODY_BYTES)
                .await
                .map_err(Error::Internal)?;

        if is_html {
            let text = String::from_utf8_lossy(&bytes);
            if let Some(reason) = detect_opt_out(&headers, Some(&text), true) {
                debug!(url = url_str, reason, "opt-out signal detected");
                return Err(Error::policy(reason));
            }
        } else if let Some(reason) = detect_opt_out(&headers, None, false) {
            debug!(url = url_str, reason, "opt-out signal detected");
            return Err(Error::policy(reason));
        }

        if let Some(cache) = &self.cache {
            let _ = cache.save(url_str, &content_type, etag, last_modified, &bytes);
        }

        Ok(FetchResult {
            body: bytes,
            content_type,
            final_url,
            from_cache: false,
        })
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}
