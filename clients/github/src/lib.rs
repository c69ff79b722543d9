mod builder;
mod limiter;
mod payload;

pub use builder::{GithubClientBuilder, DEFAULT_API_URL};
pub use limiter::RateLimit;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use committer_coverage::api::{
    BillingRepository, CommitAuthor, CursorPage, Error, FetchFailure, LinkPage, RepositoryRef, Result, SeatCounters,
};
use limiter::RateLimiter;
use log::{debug, info};
use payload::{
    AdvancedSecurity, GraphQlRequest, GraphQlResponse, HistoryData, HistoryVariables, RateLimitData, Repo,
};
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

// `first` matches `committer_coverage::api::MAX_PAGE_SIZE`
const HISTORY_QUERY: &str = r#"
query RecentCommitters($owner: String!, $repo: String!, $since: GitTimestamp!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: 100, since: $since, after: $cursor) {
            pageInfo { hasNextPage endCursor }
            nodes {
              author {
                name
                email
                user { login }
              }
            }
          }
        }
      }
    }
  }
}"#;

const RATE_LIMIT_QUERY: &str = "query { rateLimit { limit remaining resetAt } }";

pub struct GithubClient {
    client: Client,
    api_url: Url,
    graphql_url: Url,
    limiter: RateLimiter,
}

impl GithubClient {
    /// Seeds the rate limiter from the GraphQL `rateLimit` introspection.
    ///
    /// Returns `None` when the server has rate limiting disabled.
    pub async fn refresh_rate_limit(&self) -> Result<Option<RateLimit>> {
        let data: RateLimitData = self.graphql(RATE_LIMIT_QUERY, serde_json::json!({})).await?;
        let body = match data.rate_limit {
            Some(body) => body,
            None => return Ok(None),
        };
        info!(
            "Rate limit: {} of {} remaining, resets at {}",
            body.remaining, body.limit, body.reset_at
        );
        let limit = RateLimit::new(Some(body.remaining), Some(body.reset_at.timestamp()));
        self.limiter.seed(limit).await;
        Ok(Some(limit))
    }

    pub async fn rate_limit(&self) -> RateLimit {
        self.limiter.current().await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.limiter.wait().await;
        let response = request.send().await?;
        self.limiter.update(response.headers()).await;
        debug!("{} responded with {}", response.url(), response.status());

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Status {
                url,
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(response)
    }

    async fn graphql<V, T>(&self, query: &str, variables: V) -> Result<T>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .post(self.graphql_url.clone())
            .json(&GraphQlRequest { query, variables });
        let response = self.send(request).await?;
        let body: GraphQlResponse<T> = read_response(response).await?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|error| error.message).collect();
            return Err(FetchFailure::GraphQl(messages.join("; ")).into());
        }
        body.data
            .ok_or_else(|| FetchFailure::Malformed("GraphQL response without data".to_string()).into())
    }

    async fn get_page<T>(&self, url: Url, query: &[(&str, &str)], page: u32, per_page: u32) -> Result<(T, bool)>
    where
        T: DeserializeOwned,
    {
        let request = self
            .client
            .get(url)
            .query(query)
            .query(&[("per_page", per_page.to_string()), ("page", page.to_string())]);
        let response = self.send(request).await?;
        let has_next = has_next_link(response.headers());
        let body = read_response(response).await?;
        Ok((body, has_next))
    }
}

#[async_trait]
impl committer_coverage::api::Client for GithubClient {
    async fn commit_history_page(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        after: Option<String>,
    ) -> Result<CursorPage<CommitAuthor>> {
        let variables = HistoryVariables {
            owner,
            repo,
            since: since.to_rfc3339_opts(SecondsFormat::Secs, true),
            cursor: after,
        };
        let data: HistoryData = self.graphql(HISTORY_QUERY, variables).await?;
        let history = match data.into_history() {
            Some(history) => history,
            None => {
                debug!("{}/{} has no commit history", owner, repo);
                return Ok(CursorPage::empty());
            }
        };
        let authors = history
            .nodes
            .into_iter()
            .filter_map(|node| node.author)
            .map(CommitAuthor::from)
            .collect();
        Ok(CursorPage::new(
            authors,
            history.page_info.has_next_page,
            history.page_info.end_cursor,
        ))
    }

    async fn organization_repos_page(&self, org: &str, page: u32, per_page: u32) -> Result<LinkPage<RepositoryRef>> {
        let url = endpoint(&self.api_url, &["orgs", org, "repos"])?;
        let (repos, has_next): (Vec<Repo>, bool) = self.get_page(url, &[("type", "all")], page, per_page).await?;
        let repos = repos.into_iter().map(RepositoryRef::from).collect();
        Ok(LinkPage::new(repos, (), has_next))
    }

    async fn advanced_security_page(
        &self,
        enterprise: &str,
        page: u32,
        per_page: u32,
    ) -> Result<LinkPage<BillingRepository, SeatCounters>> {
        let url = endpoint(
            &self.api_url,
            &["enterprises", enterprise, "settings", "billing", "advanced-security"],
        )?;
        let (billing, has_next): (AdvancedSecurity, bool) = self.get_page(url, &[], page, per_page).await?;
        let counters = billing.counters();
        let repos = billing.repositories.into_iter().map(BillingRepository::from).collect();
        Ok(LinkPage::new(repos, counters, has_next))
    }
}

pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Configuration(format!("Invalid URL {}: not a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| FetchFailure::Malformed(err.to_string()).into())
}

/// Whether any `Link` header announces a `rel="next"` relation.
fn has_next_link(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .flat_map(|link| link.split(';').skip(1))
        .filter_map(|param| param.trim().strip_prefix("rel="))
        .any(|rel| rel.trim_matches('"').split_whitespace().any(|rel| rel == "next"))
}
