//! Local filesystem implementation of the BlobStore trait.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::traits::{BlobStore, DirEntry};

/// Suffix of the scratch file used for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Blob store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct OsBlobStore {
    root: PathBuf,
}

impl OsBlobStore {
    /// Create a store rooted at `root`. The directory is not created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl BlobStore for OsBlobStore {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.full_path(path))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: if meta.is_dir() { 0 } else { meta.len() },
                is_dir: meta.is_dir(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &Path, limit: usize) -> io::Result<Option<Bytes>> {
        let file = match File::open(self.full_path(path)) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut buf = Vec::new();
        file.take((limit as u64).saturating_add(1)).read_to_end(&mut buf)?;
        Ok(Some(Bytes::from(buf)))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let target = self.full_path(path);
        let mut tmp_name = target.clone().into_os_string();
        tmp_name.push(TMP_SUFFIX);
        let tmp_path = PathBuf::from(tmp_name);

        // Atomic write: temp + fsync + rename
        let result = File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(contents)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, &target));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.full_path(path))
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(self.full_path(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn base_dir(&self) -> Option<&Path> {
        Some(&self.root)
    }
}
