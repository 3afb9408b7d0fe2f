// file: src/serializer/walker.rs
// description: Directory walking with glob selection, keeping dirs and symlinks
// reference: https://docs.rs/walkdir

use crate::error::Result;
use crate::serializer::mode::file_mode;
use crate::serializer::selection::{GitignoreRules, GlobSelection};
use std::path::{Component, Path};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// A selected filesystem entry, described without following symlinks.
#[derive(Debug, Clone)]
pub struct WalkedEntry {
    pub relative_path: String,
    pub kind: EntryKind,
    pub mode: Option<u32>,
}

impl WalkedEntry {
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

/// Lists every entry under `root` (the root itself excluded) that the
/// selection picks. Excluded and ignored directories are not descended into.
pub fn walk_entries(
    root: &Path,
    selection: &GlobSelection,
    gitignore: Option<&GitignoreRules>,
) -> Result<Vec<WalkedEntry>> {
    info!("Walking directory: {}", root.display());
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let relative = relative_slash_path(root, entry.path());
            let ignored = gitignore.is_some_and(|rules| rules.is_ignored(entry.path(), true));
            !selection.is_excluded(&relative) && !ignored
        });

    for entry in walker {
        let entry = entry?;
        let relative_path = relative_slash_path(root, entry.path());
        let file_type = entry.file_type();

        if !selection.is_selected(&relative_path) {
            continue;
        }

        if let Some(rules) = gitignore
            && rules.is_ignored(entry.path(), file_type.is_dir())
        {
            debug!("Skipping ignored entry: {}", relative_path);
            continue;
        }

        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let metadata = entry.metadata()?;

        entries.push(WalkedEntry {
            relative_path,
            kind,
            mode: file_mode(&metadata),
        });
    }

    info!("Selected {} entries", entries.len());
    Ok(entries)
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
