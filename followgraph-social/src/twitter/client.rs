//! HTTP-backed Twitter/X v2 client for the follow graph.
//!
//! The auth mode is fixed at construction and applied to every call. The underlying
//! [`HttpClient`] is configured to wait out rate-limit windows, so throttling shows up as
//! latency rather than errors.
use async_trait::async_trait;
use followgraph_common::{Credentials, ResolvedUser, UserId};
use followgraph_http::{Auth, HttpClient, OAuth1Keys, RequestOpts};
use std::borrow::Cow;

use super::source::{FollowGraphSource, FollowingPage, PageRequest};
use super::types::UsersResponse;
use crate::SocialError;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// How requests are authenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// OAuth 2.0 application-only bearer token.
    AppOnly { bearer_token: String },
    /// OAuth 1.0a on behalf of a specific user.
    UserContext(OAuth1Keys),
}

impl AuthMode {
    /// User context when all four OAuth values are non-empty, otherwise app-only when a
    /// bearer token is non-empty, otherwise a configuration error.
    pub fn select(credentials: &Credentials) -> Result<Self, SocialError> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)) = (
            non_empty(&credentials.consumer_key),
            non_empty(&credentials.consumer_secret),
            non_empty(&credentials.access_token),
            non_empty(&credentials.access_token_secret),
        ) {
            return Ok(AuthMode::UserContext(OAuth1Keys {
                consumer_key,
                consumer_secret,
                access_token,
                access_token_secret,
            }));
        }

        if let Some(bearer_token) = non_empty(&credentials.bearer_token) {
            return Ok(AuthMode::AppOnly { bearer_token });
        }

        Err(SocialError::Config(
            "provide either bearer_token for application-only authentication, or \
             consumer_key, consumer_secret, access_token and access_token_secret for \
             user-context authentication"
                .into(),
        ))
    }

    pub fn is_user_context(&self) -> bool {
        matches!(self, AuthMode::UserContext(_))
    }

    fn as_auth(&self) -> Auth<'_> {
        match self {
            AuthMode::AppOnly { bearer_token } => Auth::Bearer(bearer_token),
            AuthMode::UserContext(keys) => Auth::OAuth1(keys),
        }
    }
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    auth: AuthMode,
}

impl TwitterApi {
    /// Client against `api_base` that blocks through rate-limit windows.
    pub fn new(auth: AuthMode, api_base: &str) -> Result<Self, SocialError> {
        let http = HttpClient::new(api_base)?.with_rate_limit_wait(true);
        Ok(Self { http, auth })
    }

    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth
    }

    pub fn user_context(&self) -> bool {
        self.auth.is_user_context()
    }
}

/// Pick the auth mode from `credentials` and connect.
///
/// Returns the client plus whether user-context auth is in effect. Fails before any
/// network traffic when neither mode is satisfiable.
pub fn build_client(
    credentials: &Credentials,
    api_base: &str,
) -> Result<(TwitterApi, bool), SocialError> {
    let auth = AuthMode::select(credentials)?;
    let user_auth = auth.is_user_context();
    tracing::info!(
        auth_mode = if user_auth { "user_context" } else { "app_only" },
        api_base,
        "twitter.client.ready"
    );
    Ok((TwitterApi::new(auth, api_base)?, user_auth))
}

#[async_trait]
impl FollowGraphSource for TwitterApi {
    async fn lookup_users(&self, usernames: &[String]) -> Result<Vec<ResolvedUser>, SocialError> {
        let resp: UsersResponse = self
            .http
            .get_json(
                "2/users/by",
                RequestOpts {
                    auth: self.auth.as_auth(),
                    query: vec![("usernames", Cow::Owned(usernames.join(",")))],
                    ..Default::default()
                },
            )
            .await?;

        if let Some(problems) = &resp.errors {
            let missing: Vec<&str> = problems.iter().filter_map(|p| p.value.as_deref()).collect();
            tracing::debug!(count = problems.len(), ?missing, "twitter.lookup.partial_errors");
        }

        resp.data
            .unwrap_or_default()
            .into_iter()
            .map(|u| {
                Ok(ResolvedUser {
                    id: u.user_id()?,
                    username: u.username,
                })
            })
            .collect()
    }

    async fn following_page(
        &self,
        id: UserId,
        request: PageRequest<'_>,
    ) -> Result<FollowingPage, SocialError> {
        let mut query: Vec<(&str, Cow<'_, str>)> =
            vec![("max_results", Cow::Owned(request.max_results.to_string()))];
        if let Some(fields) = request.fields.query_value() {
            query.push(("user.fields", Cow::Owned(fields)));
        }
        if let Some(token) = request.pagination_token {
            query.push(("pagination_token", Cow::Borrowed(token)));
        }

        let path = format!("2/users/{id}/following");
        let resp: UsersResponse = self
            .http
            .get_json(
                &path,
                RequestOpts {
                    auth: self.auth.as_auth(),
                    query,
                    ..Default::default()
                },
            )
            .await?;

        Ok(FollowingPage {
            users: resp.data.unwrap_or_default(),
            next_token: resp.meta.and_then(|m| m.next_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(pairs: &[(&str, &str)]) -> Credentials {
        let mut c = Credentials::default();
        for (k, v) in pairs {
            c.set(k, *v);
        }
        c
    }

    #[test]
    fn full_oauth_quadruple_selects_user_context() {
        let c = creds(&[
            ("bearer_token", "b"),
            ("consumer_key", "ck"),
            ("consumer_secret", "cs"),
            ("access_token", "at"),
            ("access_token_secret", "ats"),
        ]);
        let mode = AuthMode::select(&c).unwrap();
        assert!(mode.is_user_context());
    }

    #[test]
    fn bearer_only_selects_app_only() {
        let c = creds(&[("bearer_token", "b"), ("consumer_key", "ck")]);
        assert_eq!(
            AuthMode::select(&c).unwrap(),
            AuthMode::AppOnly {
                bearer_token: "b".into()
            }
        );
    }

    #[test]
    fn incomplete_credentials_are_a_config_error() {
        let cases = [
            creds(&[]),
            creds(&[("consumer_key", "ck"), ("consumer_secret", "cs")]),
            creds(&[
                ("consumer_key", "ck"),
                ("consumer_secret", "cs"),
                ("access_token", "at"),
            ]),
        ];
        for c in cases {
            assert!(matches!(AuthMode::select(&c), Err(SocialError::Config(_))));
        }
    }

    #[test]
    fn whitespace_values_do_not_count() {
        let c = Credentials {
            bearer_token: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(AuthMode::select(&c), Err(SocialError::Config(_))));
    }

    #[test]
    fn build_client_reports_user_auth_flag() {
        let c = creds(&[("bearer_token", "b")]);
        let (api, user_auth) = build_client(&c, DEFAULT_API_BASE).unwrap();
        assert!(!user_auth);
        assert!(!api.user_context());
    }
}
