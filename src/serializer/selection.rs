// file: src/serializer/selection.rs
// description: glob include/exclude selection and nested gitignore rules
// reference: https://docs.rs/globset, https://docs.rs/ignore

use crate::error::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const DEFAULT_GLOB_PATTERNS: &[&str] = &["**", "!.git"];

/// Include patterns plus `!`-prefixed exclude patterns, matched against
/// `/`-separated paths relative to the walk root.
#[derive(Debug, Clone)]
pub struct GlobSelection {
    include: GlobSet,
    exclude: GlobSet,
}

impl GlobSelection {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            let (target, pattern) = match pattern.strip_prefix('!') {
                Some(negated) => (&mut exclude, negated),
                None => (&mut include, pattern),
            };
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
            if pattern.is_empty() {
                continue;
            }

            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .backslash_escape(true)
                .build()?;
            target.add(glob);
        }

        Ok(Self {
            include: include.build()?,
            exclude: exclude.build()?,
        })
    }

    pub fn default_selection() -> Result<Self> {
        Self::new(DEFAULT_GLOB_PATTERNS)
    }

    pub fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.is_match(relative)
    }

    pub fn is_selected(&self, relative: &str) -> bool {
        self.include.is_match(relative) && !self.is_excluded(relative)
    }
}

/// Every `.gitignore` under a root, each applying to its own subtree.
#[derive(Debug, Clone, Default)]
pub struct GitignoreRules {
    // deepest directory first
    matchers: Vec<Gitignore>,
}

impl GitignoreRules {
    pub fn discover(root: &Path) -> Result<Self> {
        let mut matchers = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.file_name() != ".gitignore" {
                continue;
            }

            let dir = entry.path().parent().unwrap_or(root);
            let mut builder = GitignoreBuilder::new(dir);
            if let Some(err) = builder.add(entry.path()) {
                return Err(err.into());
            }
            debug!("Loaded ignore rules from {}", entry.path().display());
            matchers.push(builder.build()?);
        }

        matchers.sort_by_key(|matcher| {
            std::cmp::Reverse(without_cur_dir(matcher.path()).components().count())
        });
        Ok(Self { matchers })
    }

    /// `path` must be the walked path (root-prefixed, as produced by the walk).
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let path = without_cur_dir(path);
        for matcher in &self.matchers {
            if !path.starts_with(without_cur_dir(matcher.path())) {
                continue;
            }
            match matcher.matched_path_or_any_parents(&path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }
}

// `ignore` drops a leading `./` from matcher roots but walked paths keep it
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_selection_excludes_git_dir() {
        let selection = GlobSelection::default_selection().unwrap();

        assert!(selection.is_selected("README.md"));
        assert!(selection.is_selected("src/deep/mod.rs"));
        assert!(selection.is_selected(".env"));
        assert!(selection.is_excluded(".git"));
        assert!(!selection.is_selected(".git"));
        assert!(selection.is_selected(".github/workflows/ci.yaml"));
    }

    #[test]
    fn test_custom_patterns_with_exclusions() {
        let selection = GlobSelection::new(&["./**/*.rs", "!target"]).unwrap();

        assert!(selection.is_selected("src/lib.rs"));
        assert!(selection.is_selected("main.rs"));
        assert!(!selection.is_selected("Cargo.toml"));
        assert!(selection.is_excluded("target"));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let selection = GlobSelection::new(&["*.md"]).unwrap();

        assert!(selection.is_selected("README.md"));
        assert!(!selection.is_selected("docs/guide.md"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(GlobSelection::new(&["src/[unclosed"]).is_err());
    }

    #[test]
    fn test_nested_gitignore_rules() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join(".gitignore"), "*.tmp\nbuild/\n").unwrap();
        fs::create_dir_all(root.path().join("pkg")).unwrap();
        fs::write(root.path().join("pkg/.gitignore"), "secret.txt\n!keep.tmp\n").unwrap();

        let rules = GitignoreRules::discover(root.path()).unwrap();

        assert!(rules.is_ignored(&root.path().join("scratch.tmp"), false));
        assert!(rules.is_ignored(&root.path().join("build"), true));
        assert!(rules.is_ignored(&root.path().join("build/out.bin"), false));
        assert!(rules.is_ignored(&root.path().join("pkg/secret.txt"), false));
        assert!(!rules.is_ignored(&root.path().join("secret.txt"), false));
        assert!(!rules.is_ignored(&root.path().join("pkg/keep.tmp"), false));
        assert!(!rules.is_ignored(&root.path().join("src/main.rs"), false));
    }

    #[test]
    fn test_cur_dir_components_are_ignored_when_matching() {
        assert_eq!(
            without_cur_dir(Path::new("./ws/./pkg/secret.txt")),
            PathBuf::from("ws/pkg/secret.txt")
        );
        assert_eq!(without_cur_dir(Path::new(".")), PathBuf::new());
        assert!(Path::new("pkg/a").starts_with(without_cur_dir(Path::new("."))));
    }

    #[test]
    fn test_no_gitignore_files() {
        let root = TempDir::new().unwrap();
        let rules = GitignoreRules::discover(root.path()).unwrap();

        assert!(!rules.is_ignored(&root.path().join("anything"), false));
    }
}
