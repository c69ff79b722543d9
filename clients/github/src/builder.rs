use crate::limiter::RateLimiter;
use crate::GithubClient;
use committer_coverage::api::{Error, Result};
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

pub struct GithubClientBuilder {
    client_builder: ClientBuilder,
    api_url: String,
    graphql_url: Option<String>,
    headers: HeaderMap,
}

impl Default for GithubClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("committer-coverage"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        Self {
            client_builder: ClientBuilder::default(),
            api_url: DEFAULT_API_URL.to_string(),
            graphql_url: None,
            headers,
        }
    }
}

impl GithubClientBuilder {
    pub fn try_with_token(self, token: &secrecy::SecretString) -> Result<GithubClientBuilder> {
        let mut value = header_value(format!("Bearer {}", token.expose_secret()))?;
        value.set_sensitive(true);
        Ok(self.with_header(header::AUTHORIZATION, value))
    }

    pub fn try_with_user_agent<STR: AsRef<str>>(self, user_agent: STR) -> Result<GithubClientBuilder> {
        let value = header_value(user_agent)?;
        Ok(self.with_header(header::USER_AGENT, value))
    }

    pub fn with_api_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.api_url = url.as_ref().to_string();
        self
    }

    /// Overrides the GraphQL endpoint, `<api_url>/graphql` by default.
    pub fn with_graphql_url<STR: AsRef<str>>(mut self, url: STR) -> GithubClientBuilder {
        self.graphql_url = Some(url.as_ref().to_string());
        self
    }

    fn with_header(mut self, key: HeaderName, val: HeaderValue) -> GithubClientBuilder {
        self.headers.insert(key, val);
        self
    }

    pub fn build(self) -> Result<GithubClient> {
        let api_url = base_url(&self.api_url)?;
        let graphql_url = match self.graphql_url {
            Some(graphql_url) => base_url(&graphql_url)?,
            None => crate::endpoint(&api_url, &["graphql"])?,
        };
        let client = self.client_builder.default_headers(self.headers).build()?;
        Ok(GithubClient {
            client,
            api_url,
            graphql_url,
            limiter: RateLimiter::default(),
        })
    }
}

fn header_value(val: impl AsRef<str>) -> Result<HeaderValue> {
    HeaderValue::from_str(val.as_ref()).map_err(|err| Error::Configuration(format!("Invalid header value: {}", err)))
}

fn base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|err| Error::Configuration(format!("Invalid URL {}: {}", url, err)))?;
    if parsed.cannot_be_a_base() {
        return Err(Error::Configuration(format!("Invalid URL {}: not a base URL", url)));
    }
    Ok(parsed)
}
