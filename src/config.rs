// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, ScaffoldError};
use crate::repository::integrations::{IntegrationConfig, IntegrationsRegistry, default_integrations};
use crate::serializer::DEFAULT_MAX_CONCURRENT_READS;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub serializer: SerializerConfig,
    #[serde(default = "default_integrations")]
    pub integrations: Vec<IntegrationConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerializerConfig {
    #[serde(default = "default_max_concurrent_reads")]
    pub max_concurrent_reads: usize,
    #[serde(default)]
    pub gitignore: bool,
    /// Empty means the built-in selection.
    #[serde(default)]
    pub glob_patterns: Vec<String>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
            gitignore: false,
            glob_patterns: Vec::new(),
        }
    }
}

fn default_max_concurrent_reads() -> usize {
    DEFAULT_MAX_CONCURRENT_READS
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SCAFFOLD_HELPERS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ScaffoldError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ScaffoldError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            serializer: SerializerConfig::default(),
            integrations: default_integrations(),
        }
    }

    pub fn registry(&self) -> IntegrationsRegistry {
        IntegrationsRegistry::new(self.integrations.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.serializer.max_concurrent_reads == 0 {
            return Err(ScaffoldError::Config(
                "max_concurrent_reads must be greater than 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for integration in &self.integrations {
            if integration.host.trim().is_empty() {
                return Err(ScaffoldError::Config(
                    "integration host must not be empty".to_string(),
                ));
            }
            if !seen.insert(integration.host.to_ascii_lowercase()) {
                return Err(ScaffoldError::Config(format!(
                    "duplicate integration for host {}",
                    integration.host
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ProviderType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();

        assert!(config.validate().is_ok());
        assert_eq!(config.serializer.max_concurrent_reads, 10);
        assert_eq!(
            config.registry().provider_for_host("github.com"),
            Some(ProviderType::Github)
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scaffold.toml");
        fs::write(
            &path,
            r#"
[serializer]
max_concurrent_reads = 4
gitignore = true

[[integrations]]
host = "ghe.example.com"
provider = "github"
api_base_url = "https://ghe.example.com/api/v3"
token = "t0k3n"

[[integrations]]
host = "review.example.com"
provider = "gerrit"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();

        assert_eq!(config.serializer.max_concurrent_reads, 4);
        assert!(config.serializer.gitignore);
        assert_eq!(config.integrations.len(), 2);
        let registry = config.registry();
        assert_eq!(
            registry.provider_for_host("review.example.com"),
            Some(ProviderType::Gerrit)
        );
        assert_eq!(
            registry.by_host("ghe.example.com").and_then(|i| i.token.as_deref()),
            Some("t0k3n")
        );
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = Config::default_config();
        config.serializer.max_concurrent_reads = 0;

        assert!(matches!(config.validate(), Err(ScaffoldError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_hosts() {
        let mut config = Config::default_config();
        config
            .integrations
            .push(IntegrationConfig::new("GitHub.com", ProviderType::Github));

        assert!(matches!(config.validate(), Err(ScaffoldError::Config(_))));
    }
}
