//! Minimal HTTP client with safe logging, retries, rate-limit waiting, and provider auth.
//!
//! - Request options: headers, [`Auth`], query params, timeout, retries
//! - OAuth 2.0 bearer and OAuth 1.0a (HMAC-SHA1) user-context signing
//! - Retries transient network failures and 5xx with exponential backoff
//! - With [`HttpClient::with_rate_limit_wait`], a 429 blocks until the provider's
//!   `x-rate-limit-reset` window passes and then retries, without spending the retry budget
//! - Redacts secret query params and never logs credentials
//! - Optional raw request/response logging via `FOLLOWGRAPH_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), followgraph_http::HttpError> {
//! let client = followgraph_http::HttpClient::new("https://api.example.com")?
//!     .with_rate_limit_wait(true);
//! let got: serde_json::Value = client
//!     .get_json("v1/items", followgraph_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start, response
//! headers (including `x-rate-limit-*`), body snippets, retries, rate-limit sleeps and
//! final errors. Raw lines use target `http.raw`.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

pub mod auth;
mod diagnostics;

pub use auth::{Auth, OAuth1Keys};

use auth::{OAuthNonce, authorization_header};
use diagnostics::{
    RAW_MAX_BODY, extract_error_message, header_str, make_curl, raw_enabled, rate_limit_wait,
    redact_headers, redact_query, snip_body,
};

/// Sleep used after a 429 that carries neither `x-rate-limit-reset` nor `Retry-After`.
const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(60);

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use followgraph_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     auth: Auth::Bearer("demo"),
///     query: vec![("usernames", "alice,bob".into())],
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert_eq!(opts.auth.kind(), "bearer");
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Auth<'a>,
    pub headers: Option<HeaderMap>,
    pub query: Vec<(&'a str, Cow<'a, str>)>,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
    pub wait_on_rate_limit: bool,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use followgraph_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.twitter.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// assert_eq!(client.max_retries, 2);
    /// assert!(!client.wait_on_rate_limit);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
            max_retries: 2,
            wait_on_rate_limit: false,
        })
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// Block on HTTP 429 until the rate-limit window resets, then retry.
    pub fn with_rate_limit_wait(mut self, wait: bool) -> Self {
        self.wait_on_rate_limit = wait;
        self
    }

    /// GET JSON with per-request options (headers/query/auth/timeout/retries).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, opts).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let query: Vec<(&str, &str)> = opts.query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
        let redacted_q = redact_query(&opts.query);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let auth_kind = opts.auth.kind();
        let bearer = match &opts.auth {
            Auth::Bearer(tok) => Some(sanitize_bearer(tok)?),
            _ => None,
        };

        let mut attempt = 0usize;
        let mut rate_limit_sleeps = 0u32;

        loop {
            // ----- Build request -----
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if !query.is_empty() {
                rb = rb.query(&query);
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            match (&opts.auth, &bearer) {
                (Auth::Bearer(_), Some(tok)) => rb = rb.bearer_auth(tok),
                (Auth::OAuth1(keys), _) => {
                    // fresh nonce/timestamp per attempt
                    let header =
                        authorization_header(keys, method.as_str(), &url, &query, &OAuthNonce::fresh());
                    let value = HeaderValue::from_str(&header)
                        .map_err(|e| HttpError::Build(format!("invalid OAuth header: {e}")))?;
                    rb = rb.header(AUTHORIZATION, value);
                }
                _ => {}
            }

            let req_id = format!("r{}", uuid::Uuid::new_v4().simple());
            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query=?redacted_q,
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                "http.request.start"
            );
            if raw_enabled() {
                let mut shown = url.clone();
                if !query.is_empty() {
                    shown.query_pairs_mut().extend_pairs(query.iter());
                }
                let curl = make_curl(&method, &shown, auth_kind);
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            // ----- Send -----
            let t0 = Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(req_id=%req_id, attempt, message=%message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let request_id = header_str(&headers, "x-request-id")
                .or_else(|| header_str(&headers, "x-transaction-id"))
                .unwrap_or("-")
                .to_string();
            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                x_request_id=%request_id,
                rate_limit.limit=?header_str(&headers, "x-rate-limit-limit"),
                rate_limit.remaining=?header_str(&headers, "x-rate-limit-remaining"),
                rate_limit.reset=?header_str(&headers, "x-rate-limit-reset"),
                "http.response.headers"
            );
            if raw_enabled() {
                let cut = bytes.len().min(RAW_MAX_BODY);
                let text = String::from_utf8_lossy(&bytes[..cut]);
                tracing::info!(
                    target: "http.raw",
                    %req_id,
                    %status,
                    duration_ms=dur_ms,
                    headers=?redact_headers(&headers),
                    body=%text,
                    truncated=bytes.len() > RAW_MAX_BODY
                );
            }
            let snippet = snip_body(&bytes);
            tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

            // ----- Success path -----
            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id=%req_id,
                        serde_line=%e.line(),
                        serde_col=%e.column(),
                        serde_err=%e,
                        body_snippet=%snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            let message = extract_error_message(&bytes);

            // ----- Rate limited: block until the window resets -----
            if status == StatusCode::TOO_MANY_REQUESTS && self.wait_on_rate_limit {
                rate_limit_sleeps += 1;
                let now = time::OffsetDateTime::now_utc().unix_timestamp();
                let delay = rate_limit_wait(&headers, now, RATE_LIMIT_FALLBACK);
                tracing::warn!(
                    req_id=%req_id,
                    sleep_secs=delay.as_secs(),
                    rate_limit_sleeps,
                    host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                    "http.rate_limited"
                );
                sleep(delay).await;
                continue;
            }

            // ----- Transient: maybe retry -----
            let transient = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if transient && attempt < max_retries {
                attempt += 1;
                let delay = diagnostics::retry_after(&headers).unwrap_or_else(|| backoff(attempt));
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

fn backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(10) as u32;
    Duration::from_millis(200u64.saturating_mul(1 << shift))
}

/// Strip quotes and whitespace that creep into tokens copied from dashboards or dotenv files.
fn sanitize_bearer(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if !s.is_ascii() || s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "bearer token contains non-ASCII or control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
