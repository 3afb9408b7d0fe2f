// file: src/repository/integrations.rs
// description: Host to provider lookup table built from integration config
// reference: scaffolder integrations configuration

use crate::repository::repo_url::ProviderType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct IntegrationConfig {
    pub host: String,
    pub provider: ProviderType,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl IntegrationConfig {
    pub fn new(host: impl Into<String>, provider: ProviderType) -> Self {
        Self {
            host: host.into(),
            provider,
            api_base_url: None,
            token: None,
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Configured API base URL, or the provider's well-known one for this host.
    pub fn effective_api_base_url(&self) -> Option<String> {
        if let Some(url) = &self.api_base_url {
            return Some(url.trim_end_matches('/').to_string());
        }

        match self.provider {
            ProviderType::Github if self.host == "github.com" => {
                Some("https://api.github.com".to_string())
            }
            ProviderType::Github => Some(format!("https://{}/api/v3", self.host)),
            ProviderType::Gitlab => Some(format!("https://{}/api/v4", self.host)),
            ProviderType::Bitbucket
                if self.host == "bitbucket.org" || self.host == "www.bitbucket.org" =>
            {
                Some("https://api.bitbucket.org/2.0".to_string())
            }
            ProviderType::Bitbucket => Some(format!("https://{}/rest/api/1.0", self.host)),
            ProviderType::Gitea => Some(format!("https://{}/api/v1", self.host)),
            ProviderType::Gerrit | ProviderType::Azure => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegrationsRegistry {
    integrations: Vec<IntegrationConfig>,
}

impl IntegrationsRegistry {
    pub fn new(integrations: Vec<IntegrationConfig>) -> Self {
        Self { integrations }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_integrations())
    }

    pub fn by_host(&self, host: &str) -> Option<&IntegrationConfig> {
        self.integrations
            .iter()
            .find(|integration| integration.host.eq_ignore_ascii_case(host))
    }

    pub fn provider_for_host(&self, host: &str) -> Option<ProviderType> {
        self.by_host(host).map(|integration| integration.provider)
    }

    pub fn github_by_host(&self, host: &str) -> Option<&IntegrationConfig> {
        self.by_host(host)
            .filter(|integration| integration.provider == ProviderType::Github)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntegrationConfig> {
        self.integrations.iter()
    }
}

pub fn default_integrations() -> Vec<IntegrationConfig> {
    vec![
        IntegrationConfig::new("github.com", ProviderType::Github),
        IntegrationConfig::new("gitlab.com", ProviderType::Gitlab),
        IntegrationConfig::new("bitbucket.org", ProviderType::Bitbucket),
        IntegrationConfig::new("www.bitbucket.org", ProviderType::Bitbucket),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::repo_url::parse_repo_url;

    #[test]
    fn test_default_registry_lookup() {
        let registry = IntegrationsRegistry::with_defaults();

        assert_eq!(registry.provider_for_host("github.com"), Some(ProviderType::Github));
        assert_eq!(registry.provider_for_host("GitLab.com"), Some(ProviderType::Gitlab));
        assert_eq!(registry.provider_for_host("example.com"), None);
        assert_eq!(registry.iter().count(), 4);
    }

    #[test]
    fn test_github_by_host_ignores_other_providers() {
        let registry = IntegrationsRegistry::with_defaults();

        assert!(registry.github_by_host("github.com").is_some());
        assert!(registry.github_by_host("gitlab.com").is_none());
    }

    #[test]
    fn test_effective_api_base_url() {
        let public = IntegrationConfig::new("github.com", ProviderType::Github);
        let enterprise = IntegrationConfig::new("ghe.example.com", ProviderType::Github);
        let custom = IntegrationConfig::new("ghe.example.com", ProviderType::Github)
            .with_api_base_url("https://ghe.example.com/custom/");
        let gerrit = IntegrationConfig::new("review.example.com", ProviderType::Gerrit);

        assert_eq!(
            public.effective_api_base_url().as_deref(),
            Some("https://api.github.com")
        );
        assert_eq!(
            enterprise.effective_api_base_url().as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(
            custom.effective_api_base_url().as_deref(),
            Some("https://ghe.example.com/custom")
        );
        assert_eq!(gerrit.effective_api_base_url(), None);
    }

    #[test]
    fn test_registry_as_parser_lookup() {
        let registry = IntegrationsRegistry::new(vec![IntegrationConfig::new(
            "gerrit.example.com",
            ProviderType::Gerrit,
        )]);

        let descriptor =
            parse_repo_url("gerrit.example.com?repo=x", |host| registry.provider_for_host(host))
                .unwrap();
        assert_eq!(descriptor.repo.as_deref(), Some("x"));
    }
}
