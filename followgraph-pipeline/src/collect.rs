use followgraph_common::{FieldSet, RawResult, SnapshotPolicy};
use followgraph_config::RunConfig;
use followgraph_social::twitter::{
    FetchLimits, FollowGraphSource, ResolutionReport, fetch_followees_by_usernames,
};
use std::path::PathBuf;

use crate::PipelineError;
use crate::flatten::flatten;
use crate::rank::{RankedTable, rank};
use crate::snapshot::{SnapshotOutcome, write_snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTarget {
    pub path: PathBuf,
    pub policy: SnapshotPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectOptions {
    pub fields: FieldSet,
    pub limits: FetchLimits,
    /// Where to persist the raw result, if anywhere.
    pub snapshot: Option<SnapshotTarget>,
}

impl CollectOptions {
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self {
            fields: cfg.user_fields.clone(),
            limits: FetchLimits {
                lookup_batch_size: cfg.lookup_batch_size,
                following_page_size: cfg.following_page_size,
            },
            snapshot: cfg.save_raw.then(|| SnapshotTarget {
                path: cfg.raw_path(),
                policy: cfg.snapshot_policy,
            }),
        }
    }
}

#[derive(Debug)]
pub struct Collected {
    pub raw: RawResult,
    pub resolution: ResolutionReport,
    /// `None` when no snapshot was requested.
    pub snapshot: Option<SnapshotOutcome>,
}

/// Resolve `seeds`, fetch every resolved seed's followees, and optionally snapshot them.
///
/// A skipped snapshot leaves the returned data untouched.
pub async fn collect_followees<S>(
    source: &S,
    seeds: &[String],
    options: &CollectOptions,
) -> Result<Collected, PipelineError>
where
    S: FollowGraphSource + ?Sized,
{
    let (raw, resolution) =
        fetch_followees_by_usernames(source, seeds, &options.fields, options.limits).await?;

    let snapshot = match &options.snapshot {
        Some(target) => Some(write_snapshot(&raw, &target.path, target.policy)?),
        None => None,
    };

    Ok(Collected {
        raw,
        resolution,
        snapshot,
    })
}

/// Flatten and rank a raw result.
pub fn build_report(raw: RawResult, fields: &FieldSet) -> RankedTable {
    rank(flatten(raw, fields))
}
