// file: src/repository/mod.rs
// description: Repository url, integration and credential module exports
// reference: Internal module structure

pub mod credentials;
pub mod integrations;
pub mod repo_url;

pub use credentials::{
    Credentials, CredentialsProvider, HttpClientOptions, StaticCredentialsProvider,
    resolve_http_options,
};
pub use integrations::{IntegrationConfig, IntegrationsRegistry};
pub use repo_url::{ProviderType, RepoDescriptor, parse_repo_url};
