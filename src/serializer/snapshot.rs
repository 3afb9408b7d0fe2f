// file: src/serializer/snapshot.rs
// description: Directory contents to in-memory records with bounded parallel reads
// reference: https://docs.rs/tokio/latest/tokio/sync/struct.Semaphore.html

use crate::config::SerializerConfig;
use crate::error::{Result, ScaffoldError};
use crate::serializer::mode::is_executable;
use crate::serializer::selection::{DEFAULT_GLOB_PATTERNS, GitignoreRules, GlobSelection};
use crate::serializer::walker::{EntryKind, WalkedEntry, walk_entries};
use crate::utils::paths::resolve_within;
use futures::future::try_join_all;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

pub const DEFAULT_MAX_CONCURRENT_READS: usize = 10;

/// One captured entry. Symlinks carry their raw link target as content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedFile {
    pub path: String,
    pub content: Vec<u8>,
    pub executable: bool,
    pub symlink: bool,
}

impl SerializedFile {
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone)]
pub struct SerializeOptions {
    pub gitignore: bool,
    pub glob_patterns: Option<Vec<String>>,
    pub max_concurrent_reads: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            gitignore: false,
            glob_patterns: None,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

impl From<&SerializerConfig> for SerializeOptions {
    fn from(config: &SerializerConfig) -> Self {
        Self {
            gitignore: config.gitignore,
            glob_patterns: (!config.glob_patterns.is_empty()).then(|| config.glob_patterns.clone()),
            max_concurrent_reads: config.max_concurrent_reads,
        }
    }
}

/// Blocking reads performed for each retained entry.
pub trait ContentReader: Send + Sync + 'static {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_link(&self, path: &Path) -> io::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl ContentReader for FsReader {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    #[cfg(unix)]
    fn read_link(&self, path: &Path) -> io::Result<Vec<u8>> {
        use std::os::unix::ffi::OsStringExt;
        Ok(fs::read_link(path)?.into_os_string().into_vec())
    }

    #[cfg(not(unix))]
    fn read_link(&self, path: &Path) -> io::Result<Vec<u8>> {
        Ok(fs::read_link(path)?.to_string_lossy().into_owned().into_bytes())
    }
}

pub struct DirectorySerializer<R = FsReader> {
    reader: Arc<R>,
    options: SerializeOptions,
}

impl DirectorySerializer<FsReader> {
    pub fn new(options: SerializeOptions) -> Self {
        Self::with_reader(FsReader, options)
    }
}

impl<R: ContentReader> DirectorySerializer<R> {
    pub fn with_reader(reader: R, options: SerializeOptions) -> Self {
        Self {
            reader: Arc::new(reader),
            options,
        }
    }

    /// Snapshots every selected regular file and dangling symlink under `root`.
    ///
    /// Symlinks whose targets exist are left out. Any path-safety or read
    /// failure aborts the whole pass.
    pub async fn serialize(&self, root: &Path) -> Result<Vec<SerializedFile>> {
        info!("Serializing directory contents: {}", root.display());
        // ignore rules and the walk must agree on one spelling of the root
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|e| ScaffoldError::file_operation(root, e))?;

        let entries = self.collect_entries(root.clone()).await?;
        let retained = self.retain_serializable(&root, entries).await?;
        debug!("Retained {} entries for reading", retained.len());

        let files = self.read_entries(&root, retained).await?;
        info!("Serialized {} files", files.len());
        Ok(files)
    }

    async fn collect_entries(&self, root: PathBuf) -> Result<Vec<WalkedEntry>> {
        let selection = match &self.options.glob_patterns {
            Some(patterns) => GlobSelection::new(patterns.as_slice())?,
            None => GlobSelection::new(DEFAULT_GLOB_PATTERNS)?,
        };
        let gitignore = self.options.gitignore;

        tokio::task::spawn_blocking(move || {
            let rules = if gitignore {
                Some(GitignoreRules::discover(&root)?)
            } else {
                None
            };
            walk_entries(&root, &selection, rules.as_ref())
        })
        .await?
    }

    async fn retain_serializable(
        &self,
        root: &Path,
        entries: Vec<WalkedEntry>,
    ) -> Result<Vec<WalkedEntry>> {
        let checks = entries.into_iter().map(|entry| {
            let root = root.to_path_buf();
            async move {
                let keep = match entry.kind {
                    EntryKind::Directory => false,
                    EntryKind::Symlink => {
                        let relative = entry.relative_path.clone();
                        tokio::task::spawn_blocking(move || is_dangling(&root, &relative))
                            .await??
                    }
                    EntryKind::File | EntryKind::Other => true,
                };
                Ok::<_, ScaffoldError>(keep.then_some(entry))
            }
        });

        Ok(try_join_all(checks).await?.into_iter().flatten().collect())
    }

    async fn read_entries(
        &self,
        root: &Path,
        entries: Vec<WalkedEntry>,
    ) -> Result<Vec<SerializedFile>> {
        let permits = self.options.max_concurrent_reads.max(1);
        let semaphore = Arc::new(Semaphore::new(permits));

        let reads = entries.into_iter().map(|entry| {
            let semaphore = semaphore.clone();
            let reader = self.reader.clone();
            let root = root.to_path_buf();

            async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScaffoldError::Task(e.to_string()))?;

                let symlink = entry.is_symlink();
                let relative = entry.relative_path.clone();
                let content = tokio::task::spawn_blocking(move || {
                    let absolute = resolve_within(&root, &relative)?;
                    let read = if symlink {
                        reader.read_link(&absolute)
                    } else {
                        reader.read_file(&absolute)
                    };
                    read.map_err(|e| ScaffoldError::file_operation(&absolute, e))
                })
                .await??;

                drop(permit);

                Ok::<_, ScaffoldError>(SerializedFile {
                    path: entry.relative_path,
                    content,
                    executable: is_executable(entry.mode),
                    symlink,
                })
            }
        });

        try_join_all(reads).await
    }
}

/// Convenience wrapper over [`DirectorySerializer`] with the filesystem reader.
pub async fn serialize_directory_contents(
    root: &Path,
    options: SerializeOptions,
) -> Result<Vec<SerializedFile>> {
    DirectorySerializer::new(options).serialize(root).await
}

/// True only when the link's safely resolved target is missing.
///
/// Stat failures other than not-found count as present.
fn is_dangling(root: &Path, relative: &str) -> Result<bool> {
    let resolved = resolve_within(root, relative)?;

    match fs::metadata(&resolved) {
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => {
            debug!(
                "Treating {} as present after stat error: {}",
                resolved.display(),
                e
            );
            Ok(false)
        }
    }
}
