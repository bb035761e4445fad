//! Search-result canonicalization, dedup, and ranking (spec §4 aggregate
//! step). URL canonicalization reuses the same rules as secret scrubbing
//! (lowercase host, strip fragment, drop userinfo, strip tracking params)
//! so two pipelines never disagree on "the same URL".

use serde::{Deserialize, Serialize};
use url::Url;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
}

const TRACKING_PARAM_PREFIXES: [&str; 1] = ["utm_"];
const TRACKING_PARAM_EXACT: [&str; 2] = ["gclid", "fbclid"];

/// Canonicalize a URL for dedup/comparison purposes: drop userinfo and
/// fragment, lowercase the host, strip tracking params, and sort the
/// remaining query pairs for a stable string form. Returns the input
/// unchanged if it does not parse as an absolute URL.
pub fn canonicalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let _ = url.set_username("");
    let _ = url.set_password(None);
    if let Some(host) = url.host_str() {
        let lower = host.to_ascii_lowercase();
        let _ = url.set_host(Some(&lower));
    }
    url.set_fragment(None);

    let mut retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    retained.sort();

    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&retained);
    }

    let mut out = url.to_string();
    if out.ends_with('/') && url.path() == "/" && url.query().is_none() {
        out.pop();
    }
    out
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| lower.starts_with(p))
        || TRACKING_PARAM_EXACT.contains(&lower.as_str())
}

/// Merge results from multiple sources: canonicalize every URL, drop exact
/// duplicates (keeping the first occurrence, which preserves source-list
/// priority), and return in input order.
pub fn merge_and_normalize(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(results.len());
    for mut result in results {
        result.url = canonicalize_url(&result.url);
        if seen.insert(result.url.clone()) {
            out.push(result);
        }
    }
    out
}

/// Rank merged results for diversity: round-robin across distinct hosts so
/// one dominant source doesn't crowd out the rest, preserving each source's
/// internal relative order (primacy).
pub fn rank_diverse(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut by_host: std::collections::BTreeMap<String, std::collections::VecDeque<SearchResult>> =
        std::collections::BTreeMap::new();
    let mut host_order = Vec::new();

    for result in results {
        let host = Url::parse(&result.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        if !by_host.contains_key(&host) {
            host_order.push(host.clone());
        }
        by_host.entry(host).or_default().push_back(result);
    }

    let mut out = Vec::new();
    loop {
        let mut progressed = false;
        for host in &host_order {
            if let Some(bucket) = by_host.get_mut(host) {
                if let Some(result) = bucket.pop_front() {
                    out.push(result);
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    out
}
