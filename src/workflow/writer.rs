// file: src/workflow/writer.rs
// description: writes the fixed CI workflow into a generated workspace
// reference: https://docs.rs/yaml-rust

use crate::error::{Result, ScaffoldError};
use crate::utils::paths::resolve_within;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use yaml_rust::yaml::{Array, Hash};
use yaml_rust::{Yaml, YamlEmitter};

pub const WORKFLOW_PATH: &str = ".github/workflows/ci.yaml";

fn string(value: &str) -> Yaml {
    Yaml::String(value.to_string())
}

fn mapping(entries: Vec<(&str, Yaml)>) -> Yaml {
    let mut hash = Hash::new();
    for (key, value) in entries {
        hash.insert(string(key), value);
    }
    Yaml::Hash(hash)
}

fn sequence(items: Vec<Yaml>) -> Yaml {
    Yaml::Array(Array::from(items))
}

fn branch_filter() -> Yaml {
    mapping(vec![("branches", sequence(vec![string("main")]))])
}

fn step(name: &str, entries: Vec<(&str, Yaml)>) -> Yaml {
    let mut all = vec![("name", string(name))];
    all.extend(entries);
    mapping(all)
}

/// The workflow document every generated workspace receives.
pub fn workflow_document() -> Yaml {
    let steps = vec![
        step("Checkout", vec![("uses", string("actions/checkout@v4"))]),
        step(
            "Set up Node.js",
            vec![
                ("uses", string("actions/setup-node@v4")),
                (
                    "with",
                    mapping(vec![
                        ("node-version", string("20")),
                        ("cache", string("yarn")),
                    ]),
                ),
            ],
        ),
        step(
            "Install dependencies",
            vec![("run", string("yarn install --immutable"))],
        ),
        step("Type check", vec![("run", string("yarn tsc"))]),
        step("Lint", vec![("run", string("yarn lint"))]),
        step("Test", vec![("run", string("yarn test"))]),
        step("Build", vec![("run", string("yarn build"))]),
    ];

    mapping(vec![
        ("name", string("CI")),
        (
            "on",
            mapping(vec![
                ("push", branch_filter()),
                ("pull_request", branch_filter()),
            ]),
        ),
        (
            "jobs",
            mapping(vec![(
                "build",
                mapping(vec![
                    ("runs-on", string("ubuntu-latest")),
                    ("steps", sequence(steps)),
                ]),
            )]),
        ),
    ])
}

pub fn render_workflow() -> Result<String> {
    let mut rendered = String::new();
    YamlEmitter::new(&mut rendered)
        .dump(&workflow_document())
        .map_err(|e| ScaffoldError::Serialization(format!("{e:?}")))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Writes the workflow to [`WORKFLOW_PATH`] under `workspace`, replacing any
/// existing file. Returns the written path.
pub fn write_workflow(workspace: &Path) -> Result<PathBuf> {
    let target = resolve_within(workspace, WORKFLOW_PATH)?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ScaffoldError::file_operation(parent, e))?;
    }

    let rendered = render_workflow()?;
    fs::write(&target, rendered).map_err(|e| ScaffoldError::file_operation(&target, e))?;

    info!("Wrote workflow to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use yaml_rust::YamlLoader;

    #[test]
    fn test_write_workflow_creates_file() {
        let workspace = TempDir::new().unwrap();

        let written = write_workflow(workspace.path()).unwrap();

        assert!(written.ends_with(".github/workflows/ci.yaml"));
        let content = fs::read_to_string(&written).unwrap();
        let docs = YamlLoader::load_from_str(&content).unwrap();
        let doc = &docs[0];

        assert_eq!(doc["name"].as_str(), Some("CI"));
        assert_eq!(doc["jobs"]["build"]["runs-on"].as_str(), Some("ubuntu-latest"));
        assert_eq!(
            doc["on"]["push"]["branches"][0].as_str(),
            Some("main")
        );
        let steps = doc["jobs"]["build"]["steps"].as_vec().unwrap();
        assert_eq!(steps[0]["uses"].as_str(), Some("actions/checkout@v4"));
        assert_eq!(steps.len(), 7);
    }

    #[test]
    fn test_write_workflow_overwrites_existing() {
        let workspace = TempDir::new().unwrap();
        let dir = workspace.path().join(".github/workflows");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ci.yaml"), "stale").unwrap();

        let written = write_workflow(workspace.path()).unwrap();

        let content = fs::read_to_string(written).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("ubuntu-latest"));
    }

    #[test]
    fn test_rendering_is_stable() {
        assert_eq!(render_workflow().unwrap(), render_workflow().unwrap());
    }
}
