//! TDM/AI reuse opt-out signal detection (spec §4.4 step 6, §6).

use reqwest::header::HeaderMap;
use scraper::{Html, Selector};

#[cfg(test)]
mod tests;

const OPT_OUT_TOKENS: [&str; 2] = ["noai", "notrain"];

fn contains_opt_out_token(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    OPT_OUT_TOKENS.iter().any(|t| lower.contains(t))
}

/// Check `X-Robots-Tag` for `noai`/`notrain`, optionally scoped to a bot
/// name (`googlebot: noai`). Returns the offending header value for the
/// error reason.
fn check_x_robots_tag(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all("x-robots-tag") {
        if let Ok(s) = value.to_str() {
            if contains_opt_out_token(s) {
                return Some(format!("X-Robots-Tag:{}", s.trim()));
            }
        }
    }
    None
}

/// Check `Link: <...>; rel="tdm-reservation"` (quoted or bare rel value).
fn check_link_header(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all("link") {
        if let Ok(s) = value.to_str() {
            let lower = s.to_ascii_lowercase();
            if lower.contains("rel=\"tdm-reservation\"") || lower.contains("rel=tdm-reservation") {
                return Some(format!("Link:{}", s.trim()));
            }
        }
    }
    None
}

/// Check HTML `<meta name="robots|googlebot|x-robots-tag" content="...">`
/// and `<link rel="tdm-reservation">` in the parsed document.
fn check_html(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let meta_sel = Selector::parse("meta[name], meta[content]").ok()?;
    for el in doc.select(&meta_sel) {
        let name = el.value().attr("name").unwrap_or("").to_ascii_lowercase();
        if matches!(name.as_str(), "robots" | "googlebot" | "x-robots-tag") {
            if let Some(content) = el.value().attr("content") {
                if contains_opt_out_token(content) {
                    return Some(format!("meta[name={name}]:{content}"));
                }
            }
        }
    }

    let link_sel = Selector::parse("link[rel]").ok()?;
    for el in doc.select(&link_sel) {
        let rel = el.value().attr("rel").unwrap_or("").to_ascii_lowercase();
        if rel == "tdm-reservation" {
            return Some("link[rel=tdm-reservation]".to_string());
        }
    }

    None
}

/// Evaluate opt-out signals in spec order: `X-Robots-Tag`, `Link`, HTML meta,
/// HTML `<link rel="tdm-reservation">`. Returns the reason for the first
/// match found, if any. `body` and `is_html` are only consulted when header
/// checks find nothing.
pub fn detect_opt_out(headers: &HeaderMap, body: Option<&str>, is_html: bool) -> Option<String> {
    if let Some(reason) = check_x_robots_tag(headers) {
        return Some(reason);
    }
    if let Some(reason) = check_link_header(headers) {
        return Some(reason);
    }
    if is_html {
        if let Some(body) = body {
            if let Some(reason) = check_html(body) {
                return Some(reason);
            }
        }
    }
    None
}
