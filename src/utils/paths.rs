// file: src/utils/paths.rs
// description: safe child path resolution that never escapes a root directory
// reference: path traversal protection patterns

use crate::error::{Result, ScaffoldError};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolves `relative` against `root` and returns the real path it refers to.
///
/// Symlinks along the way are followed when their targets exist. A path that
/// does not exist yet resolves through its nearest existing ancestor, so a
/// dangling link resolves to the link itself. Fails with
/// [`ScaffoldError::PathSafety`] when the result lies outside `root`.
pub fn resolve_within(root: &Path, relative: impl AsRef<Path>) -> Result<PathBuf> {
    let relative = relative.as_ref();
    let canonical_root =
        fs::canonicalize(root).map_err(|e| ScaffoldError::file_operation(root, e))?;

    let joined = normalize_lexically(&canonical_root.join(relative));
    let target = resolve_real_target(&joined);

    if !target.starts_with(&canonical_root) {
        return Err(ScaffoldError::PathSafety {
            root: canonical_root,
            path: relative.to_path_buf(),
        });
    }

    Ok(target)
}

fn resolve_real_target(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve_real_target(parent).join(name),
        _ => path.to_path_buf(),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
