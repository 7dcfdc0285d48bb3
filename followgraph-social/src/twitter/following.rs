use futures::{Stream, TryStreamExt};
use followgraph_common::{FieldSet, Followee, RawResult, UserId};

use super::resolve::{ResolutionReport, resolve_user_ids};
use super::source::{FetchLimits, FollowGraphSource, PageRequest};
use crate::SocialError;

/// Lazily page through the accounts `id` follows, projecting each onto `fields`.
///
/// The stream is finite and not restartable: it ends when the provider stops returning a
/// pagination token.
pub fn followee_stream<'a, S>(
    source: &'a S,
    id: UserId,
    fields: &'a FieldSet,
    page_size: u32,
) -> impl Stream<Item = Result<Followee, SocialError>> + Send + 'a
where
    S: FollowGraphSource + ?Sized,
{
    async_stream::try_stream! {
        let mut token: Option<String> = None;
        let mut page = 0usize;
        loop {
            let request = PageRequest {
                fields,
                max_results: page_size,
                pagination_token: token.as_deref(),
            };
            let resp = source.following_page(id, request).await?;
            page += 1;
            tracing::debug!(
                %id,
                page,
                count = resp.users.len(),
                has_next = resp.next_token.is_some(),
                "following.page"
            );

            for user in resp.users {
                yield user.project(fields);
            }

            match resp.next_token {
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    tracing::warn!(%id, page, "following.repeated_cursor");
                    break;
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }
}

/// Collect every followee of `id` into memory.
pub async fn fetch_followees<S>(
    source: &S,
    id: UserId,
    fields: &FieldSet,
    page_size: u32,
) -> Result<Vec<Followee>, SocialError>
where
    S: FollowGraphSource + ?Sized,
{
    followee_stream(source, id, fields, page_size)
        .try_collect()
        .await
}

/// Resolve the seed list and fetch the followees of every resolved seed.
///
/// Seeds the provider does not recognise are reported, not fatal.
pub async fn fetch_followees_by_usernames<S>(
    source: &S,
    usernames: &[String],
    fields: &FieldSet,
    limits: FetchLimits,
) -> Result<(RawResult, ResolutionReport), SocialError>
where
    S: FollowGraphSource + ?Sized,
{
    let ids = resolve_user_ids(source, usernames, limits.lookup_batch_size).await?;
    let report = ResolutionReport::new(usernames, &ids);
    report.log();

    let mut raw = RawResult::new();
    for (username, id) in ids {
        let followees = fetch_followees(source, id, fields, limits.following_page_size).await?;
        tracing::info!(seed = %username, %id, followees = followees.len(), "following.collected");
        raw.insert(username, followees);
    }
    Ok((raw, report))
}
