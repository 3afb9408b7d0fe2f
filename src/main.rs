// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use scaffold_helpers::utils::logging::{format_entry, format_success};
use scaffold_helpers::{
    Config, SerializeOptions, parse_repo_url, resolve_http_options, serialize_directory_contents,
    write_workflow,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "scaffold-helpers")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Repository URL, credential and workspace helpers for scaffolder actions", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a repository URL such as `github.com?owner=o&repo=r`
    ParseUrl { url: String },

    /// Resolve API client options for a repository URL
    HttpOptions {
        url: String,

        #[arg(long, env = "SCAFFOLD_HELPERS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Snapshot a directory and list the captured entries
    Serialize {
        dir: PathBuf,

        #[arg(long)]
        gitignore: bool,

        #[arg(long = "glob", value_name = "PATTERN")]
        globs: Vec<String>,
    },

    /// Write the CI workflow into a workspace
    WriteWorkflow { workspace: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    scaffold_helpers::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    let config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::ParseUrl { url } => cmd_parse_url(&config, &url),
        Commands::HttpOptions { url, token } => {
            cmd_http_options(&config, &url, token.as_deref()).await
        }
        Commands::Serialize {
            dir,
            gitignore,
            globs,
        } => cmd_serialize(&config, dir, gitignore, globs).await,
        Commands::WriteWorkflow { workspace } => cmd_write_workflow(workspace),
    }
}

fn cmd_parse_url(config: &Config, url: &str) -> Result<()> {
    let registry = config.registry();
    let descriptor = parse_repo_url(url, |host| registry.provider_for_host(host))
        .with_context(|| format!("Failed to parse repository URL {url}"))?;

    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

async fn cmd_http_options(config: &Config, url: &str, token: Option<&str>) -> Result<()> {
    let registry = config.registry();
    let options = resolve_http_options(url, &registry, token, None)
        .await
        .with_context(|| format!("Failed to resolve client options for {url}"))?;

    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}

async fn cmd_serialize(
    config: &Config,
    dir: PathBuf,
    gitignore: bool,
    globs: Vec<String>,
) -> Result<()> {
    let start_time = Instant::now();

    let mut options = SerializeOptions::from(&config.serializer);
    options.gitignore |= gitignore;
    if !globs.is_empty() {
        options.glob_patterns = Some(globs);
    }

    let mut files = serialize_directory_contents(&dir, options)
        .await
        .with_context(|| format!("Failed to serialize {}", dir.display()))?;
    files.sort_by(|a, b| a.path.cmp(&b.path));

    for file in &files {
        println!(
            "{}",
            format_entry(
                &file.path,
                file.content.len(),
                file.executable,
                file.symlink,
                &file.sha256_hex()
            )
        );
    }

    let total_bytes: usize = files.iter().map(|f| f.content.len()).sum();
    eprintln!(
        "{}",
        format_success(&format!(
            "{} entries, {} bytes in {:.2}s",
            files.len(),
            total_bytes,
            start_time.elapsed().as_secs_f64()
        ))
    );
    Ok(())
}

fn cmd_write_workflow(workspace: PathBuf) -> Result<()> {
    let written = write_workflow(&workspace)
        .with_context(|| format!("Failed to write workflow into {}", workspace.display()))?;

    eprintln!(
        "{}",
        format_success(&format!("Workflow written to {}", written.display()))
    );
    Ok(())
}
