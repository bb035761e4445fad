//! Secret scrubbing applied to successful tool results and error messages
//! (spec §4.9).

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use url::Url;

#[cfg(test)]
mod tests;

const TRACKING_PARAM_PREFIXES: [&str; 1] = ["utm_"];
const TRACKING_PARAM_EXACT: [&str; 2] = ["gclid", "fbclid"];
const SECRET_QUERY_KEYS: [&str; 10] = [
    "token",
    "access_token",
    "id_token",
    "api_key",
    "apikey",
    "x_api_key",
    "key",
    "secret",
    "password",
    "auth",
];

/// Recursively scrub a JSON value: strings are checked for `Authorization`/
/// `Cookie`-style header text and for URLs needing canonicalization and
/// credential redaction; arrays and object values are recursed into.
pub fn scrub_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(scrub_string(s)),
        Value::Array(items) => Value::Array(items.iter().map(scrub_value).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), scrub_value(v));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn embedded_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"https?://[^\s<>"']+"#).unwrap())
}

/// Scrub a free-form string: header-shaped text (`Authorization: ...`,
/// `Bearer ...`, `Cookie: ...`) is redacted first, then any `http(s)://` URLs
/// embedded anywhere in the remaining text — not just a string that is
/// itself nothing but a URL — are canonicalized and credential-redacted.
/// Error messages routinely embed a failing URL inside a sentence (e.g.
/// `"GET https://api.example.com/?api_key=SECRET failed"`), so matching only
/// whole-string URLs would leave those secrets in place.
pub fn scrub_string(input: &str) -> String {
    let redacted_headers = redact_header_values(input);
    embedded_url_pattern()
        .replace_all(&redacted_headers, |caps: &regex::Captures| match Url::parse(&caps[0]) {
            Ok(url) => scrub_url(&url),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

fn redact_header_values(input: &str) -> String {
    let mut result = input.to_string();

    if let Some(idx) = result.to_ascii_lowercase().find("authorization:") {
        let prefix = &result[..idx + "authorization:".len()];
        result = format!("{prefix} [redacted]");
        return result;
    }
    if let Some(idx) = result.to_ascii_lowercase().find("bearer ") {
        let prefix = &result[..idx + "bearer ".len()];
        return format!("{prefix}[redacted]");
    }
    for header in ["cookie:", "set-cookie:"] {
        if let Some(idx) = result.to_ascii_lowercase().find(header) {
            let prefix = &result[..idx + header.len()];
            return format!("{prefix} [redacted]");
        }
    }
    result
}

/// Canonicalize a URL and redact secret-bearing query parameters:
/// drop userinfo, lowercase host, strip fragment, remove tracking params,
/// redact values of known secret-bearing keys.
fn scrub_url(url: &Url) -> String {
    let mut out = url.clone();
    let _ = out.set_username("");
    let _ = out.set_password(None);
    if let Some(host) = out.host_str() {
        let lower = host.to_ascii_lowercase();
        let _ = out.set_host(Some(&lower));
    }
    out.set_fragment(None);

    let retained: Vec<(String, String)> = out
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| {
            let key_lower = k.to_ascii_lowercase();
            if SECRET_QUERY_KEYS.contains(&key_lower.as_str()) {
                (k.into_owned(), "[redacted]".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    if retained.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(&retained);
    }

    out.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| lower.starts_with(p))
        || TRACKING_PARAM_EXACT.contains(&lower.as_str())
}
