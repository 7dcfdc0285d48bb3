use followgraph_common::UserId;
use std::collections::{BTreeMap, BTreeSet};

use super::source::FollowGraphSource;
use crate::SocialError;

/// Resolve `usernames` to IDs, one lookup per chunk of at most `batch_size`.
///
/// Usernames the provider does not know are left out of the map. Keys use the provider's
/// spelling of each username.
pub async fn resolve_user_ids<S>(
    source: &S,
    usernames: &[String],
    batch_size: usize,
) -> Result<BTreeMap<String, UserId>, SocialError>
where
    S: FollowGraphSource + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut users = BTreeMap::new();

    for (index, batch) in usernames.chunks(batch_size).enumerate() {
        let found = source.lookup_users(batch).await?;
        tracing::debug!(
            batch = index,
            requested = batch.len(),
            found = found.len(),
            "resolve.batch"
        );
        users.extend(found.into_iter().map(|u| (u.username, u.id)));
    }

    Ok(users)
}

/// Outcome of resolving a seed list, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    pub requested: usize,
    pub resolved: usize,
    pub unresolved: Vec<String>,
}

impl ResolutionReport {
    pub fn new(requested: &[String], resolved: &BTreeMap<String, UserId>) -> Self {
        let known: BTreeSet<String> = resolved.keys().map(|k| k.to_lowercase()).collect();
        let mut seen = BTreeSet::new();
        let unresolved: Vec<String> = requested
            .iter()
            .filter(|u| !known.contains(&u.to_lowercase()))
            .filter(|u| seen.insert(u.to_lowercase()))
            .cloned()
            .collect();
        let distinct: BTreeSet<String> = requested.iter().map(|u| u.to_lowercase()).collect();
        Self {
            requested: distinct.len(),
            resolved: resolved.len(),
            unresolved,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Informational only; partial resolution never fails the run.
    pub fn log(&self) {
        if self.is_complete() {
            tracing::info!(requested = self.requested, "All {} user IDs collected.", self.requested);
        } else {
            tracing::info!(
                requested = self.requested,
                resolved = self.resolved,
                unresolved = ?self.unresolved,
                "{} user IDs out of {} usernames found",
                self.resolved,
                self.requested
            );
        }
    }
}
