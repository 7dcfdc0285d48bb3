//! Twitter/X follow-graph integration.
//!
//! - [`client`]: auth mode selection and the HTTP-backed [`TwitterApi`]
//! - [`source`]: the narrow capability trait the pipeline depends on
//! - [`resolve`]: batched username to ID resolution
//! - [`following`]: paginated followee retrieval and attribute projection
//! - [`types`]: wire models for the v2 user endpoints
pub mod client;
pub mod following;
pub mod resolve;
pub mod source;
pub mod types;

pub use client::{AuthMode, TwitterApi, build_client};
pub use following::{fetch_followees, fetch_followees_by_usernames, followee_stream};
pub use resolve::{ResolutionReport, resolve_user_ids};
pub use source::{FetchLimits, FollowGraphSource, FollowingPage, PageRequest};
