//! In-memory implementation of the BlobStore trait.
//!
//! Used for tests and for serving Git snapshots. It has the same semantics
//! as the filesystem backend but keeps everything in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;

use crate::traits::{BlobStore, DirEntry};

/// In-memory blob store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryBlobStore {
    inner: RwLock<MemoryBlobStoreInner>,
}

struct MemoryBlobStoreInner {
    /// Directories, including the root (empty path).
    dirs: BTreeSet<PathBuf>,

    /// File contents by path.
    files: BTreeMap<PathBuf, Bytes>,
}

impl MemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(PathBuf::new());
        Self {
            inner: RwLock::new(MemoryBlobStoreInner {
                dirs,
                files: BTreeMap::new(),
            }),
        }
    }

    /// Load a snapshot of a directory tree on disk.
    ///
    /// Entries whose name is in `skip` (for example `.git`) are not loaded.
    pub fn from_dir(root: &Path, skip: &[&str]) -> io::Result<Self> {
        let store = Self::new();
        {
            let mut inner = store.write_inner()?;
            load_dir(&mut inner, root, Path::new(""), skip)?;
        }
        Ok(store)
    }

    fn read_inner(&self) -> io::Result<RwLockReadGuard<'_, MemoryBlobStoreInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write_inner(&self) -> io::Result<RwLockWriteGuard<'_, MemoryBlobStoreInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn load_dir(
    inner: &mut MemoryBlobStoreInner,
    disk: &Path,
    rel: &Path,
    skip: &[&str],
) -> io::Result<()> {
    inner.dirs.insert(rel.to_path_buf());
    for entry in fs::read_dir(disk)? {
        let entry = entry?;
        let name = entry.file_name();
        if skip.iter().any(|s| name == *s) {
            continue;
        }
        let child = rel.join(&name);
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            load_dir(inner, &entry.path(), &child, skip)?;
        } else if file_type.is_file() {
            let contents = fs::read(entry.path())?;
            inner.files.insert(child, Bytes::from(contents));
        }
    }
    Ok(())
}

impl BlobStore for MemoryBlobStore {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let inner = self.read_inner()?;
        if !inner.dirs.contains(path) {
            return Err(not_found(path));
        }

        let child_name = |p: &Path| -> Option<String> {
            if p.parent() == Some(path) && p != path {
                p.file_name().map(|n| n.to_string_lossy().into_owned())
            } else {
                None
            }
        };

        let mut entries: Vec<DirEntry> = inner
            .dirs
            .iter()
            .filter_map(|d| {
                child_name(d).map(|name| DirEntry {
                    name,
                    size: 0,
                    is_dir: true,
                })
            })
            .collect();
        entries.extend(inner.files.iter().filter_map(|(f, contents)| {
            child_name(f).map(|name| DirEntry {
                name,
                size: contents.len() as u64,
                is_dir: false,
            })
        }));
        Ok(entries)
    }

    fn read(&self, path: &Path, limit: usize) -> io::Result<Option<Bytes>> {
        let inner = self.read_inner()?;
        Ok(inner.files.get(path).map(|contents| {
            let end = contents.len().min(limit.saturating_add(1));
            contents.slice(..end)
        }))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.write_inner()?;
        let parent = path.parent().ok_or_else(|| not_found(path))?;
        if !inner.dirs.contains(parent) {
            return Err(not_found(parent));
        }
        if inner.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            ));
        }
        inner
            .files
            .insert(path.to_path_buf(), Bytes::copy_from_slice(contents));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.write_inner()?;
        for ancestor in path.ancestors() {
            if inner.files.contains_key(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{}: not a directory", ancestor.display()),
                ));
            }
            inner.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        let inner = self.read_inner()?;
        Ok(inner.dirs.contains(path) || inner.files.contains_key(path))
    }

    fn base_dir(&self) -> Option<&Path> {
        None
    }
}
