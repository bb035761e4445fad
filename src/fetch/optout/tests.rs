use super::*;
use reqwest::header::{HeaderMap, HeaderValue};

#[test]
fn x_robots_tag_noai_detected() {
    let mut headers = HeaderMap::new();
    headers.insert("x-robots-tag", HeaderValue::from_static("noai"));
    let reason = detect_opt_out(&headers, None, false).unwrap();
    assert!(reason.contains("X-Robots-Tag"));
    assert!(reason.contains("noai"));
}

#[test]
fn x_robots_tag_scoped_to_bot_name() {
    let mut headers = HeaderMap::new();
    headers.insert("x-robots-tag", HeaderValue::from_static("googlebot: noai"));
    assert!(detect_opt_out(&headers, None, false).is_some());
}

#[test]
fn notrain_also_detected() {
    let mut headers = HeaderMap::new();
    headers.insert("x-robots-tag", HeaderValue::from_static("notrain"));
    assert!(detect_opt_out(&headers, None, false).is_some());
}

#[test]
fn link_header_tdm_reservation_quoted() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static("<https://example.com/terms>; rel=\"tdm-reservation\""),
    );
    assert!(detect_opt_out(&headers, None, false).is_some());
}

#[test]
fn link_header_tdm_reservation_bare() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static("<https://example.com/terms>; rel=tdm-reservation"),
    );
    assert!(detect_opt_out(&headers, None, false).is_some());
}

#[test]
fn html_meta_robots_noai() {
    let headers = HeaderMap::new();
    let body = r#"<html><head><meta name="robots" content="noai, notrain"></head></html>"#;
    assert!(detect_opt_out(&headers, Some(body), true).is_some());
}

#[test]
fn html_link_tdm_reservation() {
    let headers = HeaderMap::new();
    let body = r#"<html><head><link rel="tdm-reservation" href="/terms"></head></html>"#;
    assert!(detect_opt_out(&headers, Some(body), true).is_some());
}

#[test]
fn no_signals_returns_none() {
    let headers = HeaderMap::new();
    let body = "<html><head><title>fine</title></head><body>hi</body></html>";
    assert!(detect_opt_out(&headers, Some(body), true).is_none());
}

#[test]
fn non_html_body_skips_html_checks() {
    let headers = HeaderMap::new();
    let body = "noai appears in plain text but this is not html";
    assert!(detect_opt_out(&headers, Some(body), false).is_none());
}
