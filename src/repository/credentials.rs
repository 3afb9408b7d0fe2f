// file: src/repository/credentials.rs
// description: HTTP client options and token lookup for repository hosts
// reference: https://docs.rs/reqwest

use crate::error::{Result, ScaffoldError};
use crate::repository::integrations::IntegrationsRegistry;
use crate::repository::repo_url::parse_repo_url;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const API_PREVIEWS: &[&str] = &["nebula-preview"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
}

/// Source of access tokens for repository URLs.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn get_credentials(&self, url: &str) -> Result<Credentials>;
}

/// Serves the tokens written in the integrations config, keyed by host.
#[derive(Clone, Default)]
pub struct StaticCredentialsProvider {
    tokens: HashMap<String, String>,
}

impl StaticCredentialsProvider {
    pub fn from_registry(registry: &IntegrationsRegistry) -> Self {
        let tokens = registry
            .iter()
            .filter_map(|integration| {
                integration
                    .token
                    .clone()
                    .map(|token| (integration.host.to_ascii_lowercase(), token))
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl CredentialsProvider for StaticCredentialsProvider {
    async fn get_credentials(&self, url: &str) -> Result<Credentials> {
        let parsed = Url::parse(url)
            .map_err(|e| ScaffoldError::InvalidInput(format!("Invalid credentials URL {url}: {e}")))?;

        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Ok(Credentials::default()),
        };

        Ok(Credentials {
            token: self.tokens.get(&host.to_ascii_lowercase()).cloned(),
        })
    }
}

/// Options for an API client talking to a repository host.
///
/// Serializing redacts `auth`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct HttpClientOptions {
    #[serde(serialize_with = "redact")]
    pub auth: String,
    pub base_url: Option<String>,
    pub previews: Vec<String>,
    #[serde(rename = "timeout_ms", serialize_with = "duration_millis")]
    pub timeout: Option<Duration>,
}

impl fmt::Debug for HttpClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientOptions")
            .field("auth", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("previews", &self.previews)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpClientOptions {
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("token {}", self.auth))
            .map_err(|e| ScaffoldError::InvalidInput(format!("Token is not a valid header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let accept = self
            .previews
            .iter()
            .map(|preview| format!("application/vnd.github.{preview}+json"))
            .chain(std::iter::once("application/vnd.github.v3+json".to_string()))
            .collect::<Vec<_>>()
            .join(",");
        let accept = HeaderValue::from_str(&accept)
            .map_err(|e| ScaffoldError::InvalidInput(format!("Invalid preview name: {e}")))?;
        headers.insert(ACCEPT, accept);

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("scaffold-helpers/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

/// Builds API client options for `repo_url`.
///
/// A supplied `token` is used as-is. Otherwise the token is requested from
/// `credentials_provider`, falling back to the tokens in the registry.
pub async fn resolve_http_options(
    repo_url: &str,
    registry: &IntegrationsRegistry,
    token: Option<&str>,
    credentials_provider: Option<&dyn CredentialsProvider>,
) -> Result<HttpClientOptions> {
    let descriptor = parse_repo_url(repo_url, |host| registry.provider_for_host(host))?;
    let previews: Vec<String> = API_PREVIEWS.iter().map(|p| p.to_string()).collect();

    if let Some(token) = token {
        debug!("Using supplied token for {}", descriptor.host);
        return Ok(HttpClientOptions {
            auth: token.to_string(),
            base_url: registry
                .github_by_host(&descriptor.host)
                .and_then(|integration| integration.effective_api_base_url()),
            previews,
            timeout: Some(REQUEST_TIMEOUT),
        });
    }

    let owner = descriptor.owner.as_deref().ok_or_else(|| {
        ScaffoldError::InvalidInput(format!("No owner provided for repo {repo_url}"))
    })?;
    let repo = descriptor.repo.as_deref().unwrap_or_default();

    let integration = registry.github_by_host(&descriptor.host).ok_or_else(|| {
        ScaffoldError::InvalidInput(format!("No integration for host {}", descriptor.host))
    })?;

    let credentials_url = credentials_url(&descriptor.host, owner, repo);
    debug!("Requesting credentials for {}", credentials_url);

    let credentials = match credentials_provider {
        Some(provider) => provider.get_credentials(&credentials_url).await?,
        None => {
            StaticCredentialsProvider::from_registry(registry)
                .get_credentials(&credentials_url)
                .await?
        }
    };

    let token = credentials.token.ok_or_else(|| {
        ScaffoldError::InvalidInput(format!(
            "No token available for host: {}, with owner {owner}, and repo {repo}",
            descriptor.host
        ))
    })?;

    Ok(HttpClientOptions {
        auth: token,
        base_url: integration.effective_api_base_url(),
        previews,
        timeout: None,
    })
}

/// Owner and repo are encoded as URI components, so reserved characters never
/// split or extend the path.
fn credentials_url(host: &str, owner: &str, repo: &str) -> String {
    format!(
        "https://{host}/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo)
    )
}

fn redact<S: Serializer>(_auth: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str("<redacted>")
}

fn duration_millis<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}
