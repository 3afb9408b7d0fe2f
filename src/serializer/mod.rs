// file: src/serializer/mod.rs
// description: Directory serialization module exports
// reference: Internal module structure

pub mod mode;
pub mod selection;
pub mod snapshot;
pub mod walker;

pub use mode::is_executable;
pub use selection::{DEFAULT_GLOB_PATTERNS, GitignoreRules, GlobSelection};
pub use snapshot::{
    ContentReader, DEFAULT_MAX_CONCURRENT_READS, DirectorySerializer, FsReader, SerializeOptions,
    SerializedFile, serialize_directory_contents,
};
pub use walker::{EntryKind, WalkedEntry, walk_entries};
