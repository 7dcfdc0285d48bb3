use async_trait::async_trait;
use followgraph_common::{FieldSet, MAX_FOLLOWING_PAGE, MAX_LOOKUP_BATCH, ResolvedUser, UserId};

use super::types::User;
use crate::SocialError;

/// Chunking limits passed into the resolver and fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub lookup_batch_size: usize,
    pub following_page_size: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            lookup_batch_size: MAX_LOOKUP_BATCH,
            following_page_size: MAX_FOLLOWING_PAGE,
        }
    }
}

/// One page request against the following endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub fields: &'a FieldSet,
    pub max_results: u32,
    pub pagination_token: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct FollowingPage {
    pub users: Vec<User>,
    pub next_token: Option<String>,
}

/// The provider capability the pipeline needs: batched lookup and cursor pagination.
///
/// Implementations apply their own authentication on every call and absorb rate-limit
/// waits; callers only see slow calls, never throttling errors.
#[async_trait]
pub trait FollowGraphSource: Send + Sync {
    /// Resolve one batch of usernames. Unknown usernames are simply absent from the result.
    async fn lookup_users(&self, usernames: &[String]) -> Result<Vec<ResolvedUser>, SocialError>;

    /// Fetch one page of accounts followed by `id`.
    async fn following_page(
        &self,
        id: UserId,
        request: PageRequest<'_>,
    ) -> Result<FollowingPage, SocialError>;
}
