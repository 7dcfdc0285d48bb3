use followgraph_common::{FieldSet, Followee, PublicMetrics, UserField, UserId};
use serde::{Deserialize, Serialize};

use crate::SocialError;

/// Envelope shared by `/2/users/by` and `/2/users/:id/following`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub data: Option<Vec<User>>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Partial errors delivered alongside a 200 (e.g. usernames that do not exist).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiProblem {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub pinned_tweet_id: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl User {
    pub fn user_id(&self) -> Result<UserId, SocialError> {
        self.id.parse().map_err(|_| SocialError::InvalidId {
            username: self.username.clone(),
            id: self.id.clone(),
        })
    }

    /// Keep username and name plus whatever `fields` requests; everything else is dropped.
    pub fn project(self, fields: &FieldSet) -> Followee {
        let want = |f: UserField| fields.contains(f);
        Followee {
            id: if want(UserField::Id) {
                self.id.parse().ok()
            } else {
                None
            },
            created_at: self.created_at.filter(|_| want(UserField::CreatedAt)),
            description: self.description.filter(|_| want(UserField::Description)),
            location: self.location.filter(|_| want(UserField::Location)),
            pinned_tweet_id: self.pinned_tweet_id.filter(|_| want(UserField::PinnedTweetId)),
            profile_image_url: self
                .profile_image_url
                .filter(|_| want(UserField::ProfileImageUrl)),
            protected: self.protected.filter(|_| want(UserField::Protected)),
            public_metrics: self.public_metrics.filter(|_| want(UserField::PublicMetrics)),
            url: self.url.filter(|_| want(UserField::Url)),
            verified: self.verified.filter(|_| want(UserField::Verified)),
            name: self.name,
            username: self.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_only_requested_fields() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "12",
            "username": "x",
            "name": "X",
            "description": "bio",
            "location": "Earth",
            "verified": true,
            "public_metrics": { "followers_count": 5, "following_count": 1, "tweet_count": 9, "listed_count": 0 }
        }))
        .unwrap();

        let fields: FieldSet = "description,public_metrics".parse().unwrap();
        let f = user.project(&fields);
        assert_eq!(f.username, "x");
        assert_eq!(f.name.as_deref(), Some("X"));
        assert_eq!(f.description.as_deref(), Some("bio"));
        assert_eq!(f.location, None);
        assert_eq!(f.verified, None);
        assert_eq!(f.public_metrics.and_then(|m| m.followers_count), Some(5));
    }

    #[test]
    fn requested_but_absent_attribute_is_none() {
        let user: User =
            serde_json::from_value(serde_json::json!({ "id": "1", "username": "y" })).unwrap();
        let fields: FieldSet = "id,description,verified".parse().unwrap();
        let f = user.project(&fields);
        assert_eq!(f.id, Some(UserId(1)));
        assert_eq!(f.name, None);
        assert_eq!(f.description, None);
        assert_eq!(f.verified, None);
    }

    #[test]
    fn non_numeric_id_is_reported() {
        let user = User {
            id: "abc".into(),
            username: "z".into(),
            ..Default::default()
        };
        assert!(matches!(user.user_id(), Err(SocialError::InvalidId { .. })));
    }
}
