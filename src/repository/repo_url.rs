// file: src/repository/repo_url.rs
// description: Repository pseudo-url parsing into typed descriptors
// reference: https://docs.rs/url

use crate::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Public Bitbucket Cloud host, the only one that needs a `workspace` parameter.
pub const BITBUCKET_CLOUD_HOST: &str = "www.bitbucket.org";

/// Source-control hosting platform a host name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Github,
    Gitlab,
    Bitbucket,
    Gerrit,
    Azure,
    Gitea,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Gerrit => "gerrit",
            Self::Azure => "azure",
            Self::Gitea => "gitea",
        };
        f.write_str(name)
    }
}

/// Decomposed `host?owner=..&repo=..` location of a remote repository.
///
/// `repo` is only ever absent for GitLab URLs addressed by `project` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoDescriptor {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Parses `raw` as `https://{raw}` and checks the query parameters the
/// host's provider type requires.
pub fn parse_repo_url<F>(raw: &str, host_to_provider: F) -> Result<RepoDescriptor>
where
    F: Fn(&str) -> Option<ProviderType>,
{
    let parsed = Url::parse(&format!("https://{raw}")).map_err(|e| {
        ScaffoldError::InvalidInput(format!(
            "Invalid repo URL passed to publisher, got {raw}, {e}"
        ))
    })?;

    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(ScaffoldError::InvalidInput(format!(
                "Invalid repo URL passed to publisher, got {raw}, missing host"
            )));
        }
    };

    let provider = host_to_provider(&host).ok_or_else(|| {
        ScaffoldError::InvalidInput(format!(
            "No matching integration configuration for host {host}, please check your integrations config"
        ))
    })?;

    match provider {
        ProviderType::Bitbucket => {
            if host == BITBUCKET_CLOUD_HOST {
                require_params(&parsed, &["workspace"])?;
            }
            require_params(&parsed, &["project", "repo"])?;
        }
        ProviderType::Gitlab => {
            if query_param(&parsed, "project").is_none() {
                require_params(&parsed, &["owner", "repo"])?;
            }
        }
        ProviderType::Gerrit => require_params(&parsed, &["repo"])?,
        _ => require_params(&parsed, &["repo", "owner"])?,
    }

    Ok(RepoDescriptor {
        host,
        repo: query_param(&parsed, "repo"),
        owner: query_param(&parsed, "owner"),
        organization: query_param(&parsed, "organization"),
        workspace: query_param(&parsed, "workspace"),
        project: query_param(&parsed, "project"),
    })
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn require_params(url: &Url, names: &[&str]) -> Result<()> {
    for name in names {
        if query_param(url, name).is_none() {
            return Err(ScaffoldError::InvalidInput(format!(
                "Invalid repo URL passed to publisher: {url}, missing {name}"
            )));
        }
    }
    Ok(())
}
