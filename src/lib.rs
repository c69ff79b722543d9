pub mod args;
pub mod input;
pub mod report;

pub use args::Args;

use anyhow::Context;
use committer_coverage::api::{Error, Result};
use committer_coverage::{
    reconcile, CommitterCollector, CommitterSet, CoverageResult, EntitlementFetcher, Entitlements, OrganizationExpander,
    RepositoryCommitters,
};
use github_client::GithubClientBuilder;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Everything the report is rendered from.
#[derive(Debug, Default)]
pub struct Analysis {
    pub repositories: RepositoryCommitters,
    pub entitlements: Option<Entitlements>,
    /// Present whenever `entitlements` is.
    pub coverage: Option<CoverageResult>,
}

impl Analysis {
    /// Committers of all analyzed repositories together.
    pub fn all_committers(&self) -> CommitterSet {
        let mut all = CommitterSet::default();
        for committers in self.repositories.values() {
            all.merge(committers);
        }
        all
    }
}

pub async fn analyze(args: &Args) -> Result<Analysis> {
    let mut targets = args.repos.clone();
    if let Some(csv) = &args.csv {
        targets.extend(input::read_repositories(csv)?);
    }
    if targets.is_empty() && args.orgs.is_empty() {
        return Err(Error::Configuration(
            "No repositories or organizations to analyze".to_string(),
        ));
    }

    let mut client = GithubClientBuilder::default()
        .with_api_url(&args.api_url)
        .try_with_token(&args.token)?;
    if let Some(graphql_url) = &args.graphql_url {
        client = client.with_graphql_url(graphql_url);
    }
    let client = Arc::new(client.build()?);

    if let Err(err) = client.refresh_rate_limit().await {
        warn!("Failed to read rate limit: {}", err);
    }

    let entitlements = match &args.enterprise {
        Some(enterprise) => {
            info!("Fetching GHAS data of {}", enterprise);
            Some(EntitlementFetcher::new(client.clone()).fetch(Some(enterprise.as_str())).await?)
        }
        None => None,
    };

    let mut repositories = RepositoryCommitters::new();
    let expander = OrganizationExpander::new(client.clone());
    for org in &args.orgs {
        repositories.extend(expander.expand(org).await?);
    }
    let collector = CommitterCollector::new(client);
    for target in targets {
        info!("Fetching committers of {}", target);
        let committers = collector.collect(&target.owner, &target.repo).await?;
        repositories.insert(target.to_string(), committers);
    }

    let mut analysis = Analysis {
        repositories,
        entitlements,
        coverage: None,
    };
    if let Some(entitlements) = &analysis.entitlements {
        analysis.coverage = Some(reconcile(&analysis.all_committers(), &entitlements.committers));
    }
    Ok(analysis)
}

pub fn write_report(analysis: &Analysis, path: &Path) -> Result<()> {
    let markdown = report::markdown(analysis).context("Failed to render report")?;
    std::fs::write(path, markdown).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
