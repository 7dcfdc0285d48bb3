//! Log-safe views of requests and responses: redaction, body snippets, provider error
//! messages, and rate-limit header parsing.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, Url};
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;

pub(crate) const RAW_ENV: &str = "FOLLOWGRAPH_HTTP_RAW";
pub(crate) const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

pub(crate) fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
            | "oauth_token"
            | "oauth_signature"
    )
}

pub(crate) fn redact_query(query: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(k, v)| {
            let shown = if is_secret_param(k) {
                "<redacted>".to_string()
            } else {
                v.to_string()
            };
            ((*k).to_string(), shown)
        })
        .collect()
}

pub(crate) fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization") {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Best-effort curl line for reproducing a request; credentials are never included.
pub(crate) fn make_curl(method: &Method, url: &Url, auth_kind: &str) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        redacted.set_query(None);
    } else {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    if auth_kind != "none" {
        parts.push("-H 'Authorization: <redacted>'".to_string());
    }
    parts.push(format!("'{}'", redacted.as_str().replace('\'', r"'\''")));
    parts.join(" ")
}

pub(crate) fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

/// Pull a human-readable message out of a provider error body.
pub(crate) fn extract_error_message(body: &[u8]) -> String {
    // Twitter v2: {"errors":[{"message":"...", "detail":"...", "title":"..."}]}
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // Problem details: {"title":"...","detail":"..."} or {"message":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    let first_non_empty = |candidates: [String; 3]| candidates.into_iter().find(|s| !s.is_empty());

    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            if let Some(msg) = first_non_empty([first.message, first.detail, first.title]) {
                return msg;
            }
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if let Some(msg) = first_non_empty([m.detail, m.message, m.title]) {
            return msg;
        }
    }
    snip_body(body)
}

pub(crate) fn header_str<'h>(h: &'h HeaderMap, name: &str) -> Option<&'h str> {
    h.get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn retry_after(h: &HeaderMap) -> Option<Duration> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

/// How long to sleep after a 429: until `x-rate-limit-reset` (epoch seconds) plus one
/// second, else `Retry-After`, else `fallback`.
pub(crate) fn rate_limit_wait(h: &HeaderMap, now_epoch: i64, fallback: Duration) -> Duration {
    if let Some(reset) = header_str(h, "x-rate-limit-reset").and_then(|v| v.trim().parse::<i64>().ok()) {
        let secs = (reset - now_epoch).max(0) + 1;
        return Duration::from_secs(secs as u64);
    }
    retry_after(h).unwrap_or(fallback)
}
