//! Social network clients used by followgraph.
//!
//! Only the Twitter/X v2 follow graph is implemented: username lookup and the paginated
//! "following" endpoint, behind the [`twitter::FollowGraphSource`] capability trait so the
//! pipeline can run against an in-memory fake.
pub mod twitter;

use followgraph_http::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    /// No authentication mode can be satisfied from the supplied credentials.
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("provider returned a non-numeric user id {id:?} for @{username}")]
    InvalidId { username: String, id: String },
}
