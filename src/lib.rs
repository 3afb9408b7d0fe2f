// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod repository;
pub mod serializer;
pub mod utils;
pub mod workflow;

pub use config::{Config, SerializerConfig};
pub use error::{Result, ScaffoldError};
pub use repository::{
    Credentials, CredentialsProvider, HttpClientOptions, IntegrationConfig, IntegrationsRegistry,
    ProviderType, RepoDescriptor, StaticCredentialsProvider, parse_repo_url, resolve_http_options,
};
pub use serializer::{
    ContentReader, DirectorySerializer, FsReader, SerializeOptions, SerializedFile, is_executable,
    serialize_directory_contents,
};
pub use utils::resolve_within;
pub use workflow::{WORKFLOW_PATH, write_workflow};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _options = SerializeOptions::default();
        let registry = IntegrationsRegistry::with_defaults();
        assert!(parse_repo_url("github.com?owner=o&repo=r", |h| registry.provider_for_host(h)).is_ok());
    }
}
