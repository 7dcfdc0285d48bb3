//! Collection and reporting stages for followgraph.
//!
//! The stages pass owned values from one to the next:
//! seeds -> [`collect_followees`] -> [`RawResult`] -> [`flatten`] -> [`rank`] ->
//! [`write_report`]. The raw result can be persisted with [`write_snapshot`] and reloaded
//! with [`read_snapshot`].
//!
//! [`RawResult`]: followgraph_common::RawResult
pub mod collect;
pub mod error;
pub mod flatten;
pub mod rank;
pub mod report;
pub mod schema;
pub mod seeds;
pub mod snapshot;

pub use collect::{CollectOptions, Collected, SnapshotTarget, build_report, collect_followees};
pub use error::PipelineError;
pub use flatten::{FlatRow, FlatTable, flatten};
pub use rank::{RankedRow, RankedTable, rank};
pub use report::write_report;
pub use schema::{Column, Schema};
pub use seeds::read_seed_usernames;
pub use snapshot::{SnapshotOutcome, read_snapshot, write_snapshot};
