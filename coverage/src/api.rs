use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Constructor;
use thiserror::Error;

/// Largest page the remote API serves, for both GraphQL and REST listings.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const FIRST_PAGE_NUMBER: u32 = 1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Fetch failure: {0}")]
    Fetch(#[from] FetchFailure),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("{url} responded with status {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("GraphQL query failed: {0}")]
    GraphQl(String),
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(FetchFailure::Transport(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Author of a single commit as reported by the history query.
#[derive(Debug, Clone, Default, PartialEq, Constructor)]
pub struct CommitAuthor {
    /// Login of the linked account, if the commit email maps to one.
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    pub archived: bool,
    pub is_fork: bool,
}

impl RepositoryRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One repository entry of the Advanced Security billing listing.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct BillingRepository {
    pub name: String,
    pub committers: u32,
    pub breakdown: Vec<BillingCommitter>,
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct BillingCommitter {
    pub login: String,
    pub last_pushed_email: Option<String>,
    pub last_pushed_date: Option<String>,
}

/// Aggregate counters repeated on every billing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Constructor)]
pub struct SeatCounters {
    pub total_advanced_security_committers: u32,
    pub total_count: u32,
    pub maximum_seats: u32,
    pub purchased_seats: u32,
}

impl SeatCounters {
    /// Seats still available. Negative when usage exceeds the purchase.
    pub fn remaining_seats(&self) -> i64 {
        i64::from(self.purchased_seats) - i64::from(self.total_advanced_security_committers)
    }
}

/// Page of a cursor-paginated (GraphQL) traversal.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    pub fn empty() -> Self {
        CursorPage::new(Vec::new(), false, None)
    }
}

/// Page of a numbered (REST) traversal. `meta` carries per-page data that is not an item.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct LinkPage<T, M = ()> {
    pub items: Vec<T>,
    pub meta: M,
    /// Whether the `Link` header announced a `rel="next"` page.
    pub has_next_link: bool,
}

/// Remote API, one method per page request.
#[async_trait]
pub trait Client: Send + Sync {
    /// Commits reachable from the default branch, authored at or after `since`.
    ///
    /// Returns an empty last page when the repository, its default branch or its commit target is missing.
    async fn commit_history_page(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> Result<CursorPage<CommitAuthor>>;

    async fn organization_repos_page(&self, org: &str, page: u32, per_page: u32) -> Result<LinkPage<RepositoryRef>>;

    async fn advanced_security_page(
        &self,
        enterprise: &str,
        page: u32,
        per_page: u32,
    ) -> Result<LinkPage<BillingRepository, SeatCounters>>;
}
