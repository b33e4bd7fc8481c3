//! Blob store trait: the abstract interface for registry file storage.
//!
//! This trait lets the registry be storage-agnostic. Implementations include
//! the local filesystem (primary) and an in-memory tree (tests and Git
//! snapshots).
//!
//! All paths are relative to the root of the store and use `/`-free
//! components joined with [`Path::join`].

use bytes::Bytes;
use std::io;
use std::path::Path;

/// An entry returned by [`BlobStore::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name, without the directory.
    pub name: String,
    /// Size in bytes. Zero for directories.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Storage backend for registry files.
///
/// # Design Notes
///
/// - **Bounded reads**: [`read`](BlobStore::read) never returns more than
///   `limit + 1` bytes, so a caller can detect oversized content without
///   loading all of it.
/// - **Atomic writes**: a reader never observes a partially written file.
pub trait BlobStore: Send + Sync {
    /// List a directory. Fails if the directory does not exist.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read a file, returning `None` if it does not exist.
    ///
    /// At most `limit + 1` bytes are returned.
    fn read(&self, path: &Path, limit: usize) -> io::Result<Option<Bytes>>;

    /// Replace the contents of a file atomically. The parent must exist.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Check whether a file or directory exists.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// The filesystem root backing this store, when there is one.
    fn base_dir(&self) -> Option<&Path>;
}
