use chrono::{DateTime, Utc};
use committer_coverage::api::{BillingCommitter, BillingRepository, CommitAuthor, RepositoryRef, SeatCounters};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
}

#[derive(Deserialize, Debug)]
pub struct RepoOwner {
    pub login: String,
}

impl From<Repo> for RepositoryRef {
    fn from(repo: Repo) -> Self {
        RepositoryRef::new(repo.owner.login, repo.name, repo.archived, repo.fork)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AdvancedSecurity {
    pub total_advanced_security_committers: u32,
    pub total_count: u32,
    pub maximum_advanced_security_committers: u32,
    pub purchased_advanced_security_committers: u32,
    pub repositories: Vec<AdvancedSecurityRepo>,
}

impl AdvancedSecurity {
    pub fn counters(&self) -> SeatCounters {
        SeatCounters::new(
            self.total_advanced_security_committers,
            self.total_count,
            self.maximum_advanced_security_committers,
            self.purchased_advanced_security_committers,
        )
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AdvancedSecurityRepo {
    pub name: String,
    pub advanced_security_committers: u32,
    pub advanced_security_committers_breakdown: Vec<AdvancedSecurityCommitter>,
}

impl From<AdvancedSecurityRepo> for BillingRepository {
    fn from(repo: AdvancedSecurityRepo) -> Self {
        let breakdown = repo
            .advanced_security_committers_breakdown
            .into_iter()
            .map(BillingCommitter::from)
            .collect();
        BillingRepository::new(repo.name, repo.advanced_security_committers, breakdown)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AdvancedSecurityCommitter {
    pub user_login: Option<String>,
    pub last_pushed_date: Option<String>,
    pub last_pushed_email: Option<String>,
}

impl From<AdvancedSecurityCommitter> for BillingCommitter {
    fn from(committer: AdvancedSecurityCommitter) -> Self {
        BillingCommitter::new(
            committer.user_login.unwrap_or_default(),
            committer.last_pushed_email,
            committer.last_pushed_date,
        )
    }
}

#[derive(Serialize, Debug)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct HistoryVariables<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub since: String,
    pub cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct HistoryData {
    pub repository: Option<HistoryRepository>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRepository {
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Deserialize, Debug)]
pub struct BranchRef {
    pub target: Option<CommitTarget>,
}

/// `history` is absent when the branch points at something other than a commit.
#[derive(Deserialize, Debug)]
pub struct CommitTarget {
    pub history: Option<History>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<CommitNode>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CommitNode {
    pub author: Option<GitActor>,
}

#[derive(Deserialize, Debug)]
pub struct GitActor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub user: Option<User>,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub login: String,
}

impl From<GitActor> for CommitAuthor {
    fn from(actor: GitActor) -> Self {
        CommitAuthor::new(actor.user.map(|user| user.login), actor.name, actor.email)
    }
}

impl HistoryData {
    /// The history connection, or `None` when the repository has no commit to walk.
    pub fn into_history(self) -> Option<History> {
        self.repository?.default_branch_ref?.target?.history
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitData {
    pub rate_limit: Option<RateLimitBody>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}
