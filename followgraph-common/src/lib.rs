//! Common types and utilities shared across followgraph crates.
//!
//! This crate defines the domain model that flows through the pipeline (seed users,
//! resolved identifiers, followee records, and the raw seed-to-followees mapping), the
//! credential record consumed by the API client builder, and the shared observability
//! helpers. It is intentionally lightweight so every crate can depend on it.
//!
//! # Overview
//!
//! - [`Credentials`]: authentication parameters read from a dotenv file
//! - [`UserId`] and [`ResolvedUser`]: provider-assigned identifiers
//! - [`UserField`] and [`FieldSet`]: the configurable attribute set requested per followee
//! - [`Followee`] and [`PublicMetrics`]: typed followee records with optional attributes
//! - [`RawResult`]: seed username to followee list mapping
//! - [`SnapshotPolicy`]: behavior when the raw snapshot path already exists
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use followgraph_common::{FieldSet, UserField};
//!
//! let fields: FieldSet = "description,public_metrics,verified".parse().unwrap();
//! assert!(fields.contains(UserField::PublicMetrics));
//! assert_eq!(fields.query_value().as_deref(), Some("description,public_metrics,verified"));
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

pub mod observability;

/// Authentication parameters for the provider API.
///
/// Every field is optional; deciding which authentication mode the values satisfy is the
/// client builder's job, not the loader's.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

impl Credentials {
    /// Variable names recognised in credential files, in load order.
    pub const KEYS: [&'static str; 5] = [
        "bearer_token",
        "consumer_key",
        "consumer_secret",
        "access_token",
        "access_token_secret",
    ];

    /// Assign a value by its credential-file key. Unknown keys and empty values are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        let slot = match key {
            "bearer_token" => &mut self.bearer_token,
            "consumer_key" => &mut self.consumer_key,
            "consumer_secret" => &mut self.consumer_secret,
            "access_token" => &mut self.access_token,
            "access_token_secret" => &mut self.access_token_secret,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Look up a value by its credential-file key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "bearer_token" => self.bearer_token.as_deref(),
            "consumer_key" => self.consumer_key.as_deref(),
            "consumer_secret" => self.consumer_secret.as_deref(),
            "access_token" => self.access_token.as_deref(),
            "access_token_secret" => self.access_token_secret.as_deref(),
            _ => None,
        }
    }
}

// Secrets never reach logs, even via `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("bearer_token", &mark(&self.bearer_token))
            .field("consumer_key", &mark(&self.consumer_key))
            .field("consumer_secret", &mark(&self.consumer_secret))
            .field("access_token", &mark(&self.access_token))
            .field("access_token_secret", &mark(&self.access_token_secret))
            .finish()
    }
}

/// Provider-assigned numeric account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// A seed username paired with the identifier the provider resolved it to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUser {
    pub username: String,
    pub id: UserId,
}

/// Optional user attributes a caller may request on top of username and display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Id,
    CreatedAt,
    Description,
    Location,
    PinnedTweetId,
    ProfileImageUrl,
    Protected,
    PublicMetrics,
    Url,
    Verified,
}

impl UserField {
    pub const ALL: [UserField; 10] = [
        UserField::Id,
        UserField::CreatedAt,
        UserField::Description,
        UserField::Location,
        UserField::PinnedTweetId,
        UserField::ProfileImageUrl,
        UserField::Protected,
        UserField::PublicMetrics,
        UserField::Url,
        UserField::Verified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::CreatedAt => "created_at",
            UserField::Description => "description",
            UserField::Location => "location",
            UserField::PinnedTweetId => "pinned_tweet_id",
            UserField::ProfileImageUrl => "profile_image_url",
            UserField::Protected => "protected",
            UserField::PublicMetrics => "public_metrics",
            UserField::Url => "url",
            UserField::Verified => "verified",
        }
    }

    /// `id` is always returned by the provider and is not a valid `user.fields` value.
    pub fn is_requestable(&self) -> bool {
        !matches!(self, UserField::Id)
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user field: {0}")]
pub struct UnknownUserField(pub String);

impl FromStr for UserField {
    type Err = UnknownUserField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        UserField::ALL
            .into_iter()
            .find(|f| f.as_str() == needle)
            .ok_or_else(|| UnknownUserField(needle.to_string()))
    }
}

/// Ordered, duplicate-free set of optional attributes to collect per followee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<UserField>", into = "Vec<UserField>")]
pub struct FieldSet(Vec<UserField>);

impl FieldSet {
    pub fn new(fields: impl IntoIterator<Item = UserField>) -> Self {
        let mut out = Vec::new();
        for f in fields {
            if !out.contains(&f) {
                out.push(f);
            }
        }
        Self(out)
    }

    pub fn contains(&self, field: UserField) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = UserField> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined `user.fields` query value, or `None` when nothing needs requesting.
    pub fn query_value(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .iter()
            .filter(UserField::is_requestable)
            .map(|f| f.as_str())
            .collect();
        (!parts.is_empty()).then(|| parts.join(","))
    }
}

impl From<Vec<UserField>> for FieldSet {
    fn from(v: Vec<UserField>) -> Self {
        Self::new(v)
    }
}

impl From<FieldSet> for Vec<UserField> {
    fn from(v: FieldSet) -> Self {
        v.0
    }
}

impl FromStr for FieldSet {
    type Err = UnknownUserField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|p| !p.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

/// Numeric sub-fields of a followee's public metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    FollowersCount,
    FollowingCount,
    TweetCount,
    ListedCount,
    LikeCount,
    MediaCount,
}

impl MetricField {
    pub const ALL: [MetricField; 6] = [
        MetricField::FollowersCount,
        MetricField::FollowingCount,
        MetricField::TweetCount,
        MetricField::ListedCount,
        MetricField::LikeCount,
        MetricField::MediaCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::FollowersCount => "followers_count",
            MetricField::FollowingCount => "following_count",
            MetricField::TweetCount => "tweet_count",
            MetricField::ListedCount => "listed_count",
            MetricField::LikeCount => "like_count",
            MetricField::MediaCount => "media_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweet_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_count: Option<u64>,
}

impl PublicMetrics {
    pub fn get(&self, metric: MetricField) -> Option<u64> {
        match metric {
            MetricField::FollowersCount => self.followers_count,
            MetricField::FollowingCount => self.following_count,
            MetricField::TweetCount => self.tweet_count,
            MetricField::ListedCount => self.listed_count,
            MetricField::LikeCount => self.like_count,
            MetricField::MediaCount => self.media_count,
        }
    }
}

/// An account followed by a seed user, projected onto the requested attribute set.
///
/// `username` is always present; every other attribute is `None` either because it was
/// not requested or because the provider omitted it for this account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Followee {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_tweet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl Followee {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Provider maximum for one username lookup call.
pub const MAX_LOOKUP_BATCH: usize = 100;
/// Provider maximum for one page of the following endpoint.
pub const MAX_FOLLOWING_PAGE: u32 = 1000;

/// Seed username to the ordered list of accounts it follows.
pub type RawResult = BTreeMap<String, Vec<Followee>>;

/// What the raw persister does when its target path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Keep the existing file and write nothing (first write wins).
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
    /// Refuse with an error.
    Fail,
}
