//! Request authentication: OAuth 2.0 bearer tokens and OAuth 1.0a user-context signing.
//!
//! OAuth 1.0a requests are signed with HMAC-SHA1 over the normalized method, base URL and
//! the sorted, RFC 3986 percent-encoded union of query and `oauth_*` parameters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use ring::hmac;
use std::fmt;

/// Consumer and access-token pairs for user-context requests.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth1Keys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuth1Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Keys").finish_non_exhaustive()
    }
}

/// Authentication strategies supported by the HTTP client.
///
/// ```
/// use followgraph_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert_eq!(bearer.kind(), "bearer");
/// ```
#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Authorization: OAuth ... (HMAC-SHA1 signed per request)
    OAuth1(&'a OAuth1Keys),
    #[default]
    None,
}

impl Auth<'_> {
    /// Name safe to log; never includes secret material.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::OAuth1(_) => "oauth1",
            Auth::None => "none",
        }
    }
}

/// Per-request OAuth protocol parameters that vary between calls.
#[derive(Debug, Clone)]
pub struct OAuthNonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl OAuthNonce {
    pub fn fresh() -> Self {
        Self {
            nonce: uuid::Uuid::new_v4().simple().to_string(),
            timestamp: time::OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// `scheme://host[:port]/path` with default ports elided and no query or fragment.
fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Signature base string for an OAuth 1.0a request.
pub fn signature_base_string(
    keys: &OAuth1Keys,
    method: &str,
    url: &Url,
    params: &[(&str, &str)],
    nonce: &OAuthNonce,
) -> String {
    let timestamp = nonce.timestamp.to_string();
    let oauth_params = [
        ("oauth_consumer_key", keys.consumer_key.as_str()),
        ("oauth_nonce", nonce.nonce.as_str()),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", keys.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut encoded: Vec<(String, String)> = params
        .iter()
        .chain(oauth_params.iter())
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_string_uri(url)),
        encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 signature over `base_string`.
pub fn sign(keys: &OAuth1Keys, base_string: &str) -> String {
    let signing_key = format!(
        "{}&{}",
        encode(&keys.consumer_secret),
        encode(&keys.access_token_secret)
    );
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
    STANDARD.encode(hmac::sign(&key, base_string.as_bytes()).as_ref())
}

/// Full `Authorization` header value for a signed request.
pub fn authorization_header(
    keys: &OAuth1Keys,
    method: &str,
    url: &Url,
    params: &[(&str, &str)],
    nonce: &OAuthNonce,
) -> String {
    let base = signature_base_string(keys, method, url, params, nonce);
    let signature = sign(keys, &base);
    let timestamp = nonce.timestamp.to_string();
    let fields = [
        ("oauth_consumer_key", keys.consumer_key.as_str()),
        ("oauth_nonce", nonce.nonce.as_str()),
        ("oauth_signature", signature.as_str()),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", keys.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];
    let rendered = fields
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {rendered}")
}
