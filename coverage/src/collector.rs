use crate::api::{Client, RepositoryRef, Result, MAX_PAGE_SIZE};
use crate::identity::CommitterSet;
use crate::pagination::{cursor_pages, link_pages, Termination};
use chrono::{DateTime, Duration, Utc};
use futures::{pin_mut, TryStreamExt};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Length of the commit history window, counted back from the start of each traversal.
pub const HISTORY_WINDOW_DAYS: i64 = 90;

/// Committers per repository, keyed by `<owner>/<repo>`.
pub type RepositoryCommitters = BTreeMap<String, CommitterSet>;

pub struct CommitterCollector<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
}

impl<CLIENT> CommitterCollector<CLIENT>
where
    CLIENT: Client,
{
    pub fn new(client: Arc<CLIENT>) -> Self {
        CommitterCollector { client }
    }

    /// Deduplicated committers of the repository's default branch over the last [`HISTORY_WINDOW_DAYS`].
    pub async fn collect(&self, owner: &str, repo: &str) -> Result<CommitterSet> {
        self.collect_since(owner, repo, history_cutoff(Utc::now())).await
    }

    async fn collect_since(&self, owner: &str, repo: &str, since: DateTime<Utc>) -> Result<CommitterSet> {
        let client = self.client.as_ref();
        let pages = cursor_pages(|after| client.commit_history_page(owner, repo, since, after));
        pin_mut!(pages);

        let mut committers = CommitterSet::default();
        let mut commits = 0;
        while let Some(authors) = pages.try_next().await? {
            commits += authors.len();
            for author in authors {
                if !committers.insert_author(author) {
                    debug!("Skipping anonymous commit author in {}/{}", owner, repo);
                }
            }
        }
        info!(
            "Found {} committers in {} commits of {}/{}",
            committers.len(),
            commits,
            owner,
            repo
        );
        Ok(committers)
    }
}

fn history_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(HISTORY_WINDOW_DAYS)
}

pub struct OrganizationExpander<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
    collector: CommitterCollector<CLIENT>,
}

impl<CLIENT> OrganizationExpander<CLIENT>
where
    CLIENT: Client,
{
    pub fn new(client: Arc<CLIENT>) -> Self {
        let collector = CommitterCollector::new(client.clone());
        OrganizationExpander { client, collector }
    }

    /// Committers of every active repository of `org`.
    ///
    /// Repositories that fail to collect are reported with an empty set; only a failing listing aborts.
    pub async fn expand(&self, org: &str) -> Result<RepositoryCommitters> {
        let repos = self.active_repositories(org).await?;
        info!("Collecting committers of {} repositories in {}", repos.len(), org);

        let mut committers = RepositoryCommitters::new();
        for repo in repos {
            let full_name = repo.full_name();
            let repo_committers = self
                .collector
                .collect(&repo.owner, &repo.name)
                .await
                .unwrap_or_else(|err| {
                    error!("Failed to collect committers of {}: {}", full_name, err);
                    CommitterSet::default()
                });
            committers.insert(full_name, repo_committers);
        }
        Ok(committers)
    }

    async fn active_repositories(&self, org: &str) -> Result<Vec<RepositoryRef>> {
        let client = self.client.as_ref();
        let pages = link_pages(Termination::EmptyBatch, |page| {
            client.organization_repos_page(org, page, MAX_PAGE_SIZE)
        });
        pin_mut!(pages);

        let mut repos = Vec::new();
        while let Some(page) = pages.try_next().await? {
            for repo in page.items {
                if repo.archived || repo.is_fork {
                    debug!("Skipping {} (archived: {}, fork: {})", repo.full_name(), repo.archived, repo.is_fork);
                    continue;
                }
                repos.push(repo);
            }
        }
        Ok(repos)
    }
}
