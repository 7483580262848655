//! Host filesystem backend.
//!
//! Maps `FsPath` values to OS paths under a root directory. On Linux the
//! root is an ordinary directory; on ESP32 it is the VFS mount point of the
//! SPIFFS partition (e.g. `/spiffs`), which has no real directories.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use super::{EntryKind, FileSystem, FsEntry};
use crate::path::FsPath;

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone)]
pub struct HostFs {
    root: PathBuf,
    create_parent_dirs: bool,
}

impl HostFs {
    /// Create a backend rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_parent_dirs: false,
        }
    }

    /// Create missing parent directories when creating files.
    ///
    /// Leave this off for SPIFFS, where `mkdir` is unsupported and slashes
    /// are ordinary filename characters.
    pub fn with_parent_dirs(mut self, enabled: bool) -> Self {
        self.create_parent_dirs = enabled;
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a path to an OS path.
    fn host_path(&self, path: &FsPath) -> PathBuf {
        let relative = path.relative().trim_end_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl FileSystem for HostFs {
    type Reader = File;
    type Writer = File;

    fn exists(&self, path: &FsPath) -> bool {
        self.host_path(path).exists()
    }

    fn open(&self, path: &FsPath) -> io::Result<Self::Reader> {
        let file = File::open(self.host_path(path))?;
        if file.metadata()?.is_dir() {
            return Err(io::Error::new(
                ErrorKind::Other,
                format!("is a directory: {}", path),
            ));
        }
        Ok(file)
    }

    fn create(&self, path: &FsPath) -> io::Result<Self::Writer> {
        let host_path = self.host_path(path);
        if self.create_parent_dirs {
            if let Some(parent) = host_path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        File::create(host_path)
    }

    fn remove(&self, path: &FsPath) -> io::Result<()> {
        let host_path = self.host_path(path);
        if fs::metadata(&host_path)?.is_dir() {
            fs::remove_dir(host_path)
        } else {
            fs::remove_file(host_path)
        }
    }

    fn read_dir(&self, dir: &FsPath) -> io::Result<Vec<FsEntry>> {
        let host_path = self.host_path(dir);
        match fs::metadata(&host_path) {
            Ok(metadata) if !metadata.is_dir() => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            _ => {}
        }
        let read_dir = fs::read_dir(host_path)?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("Skipping non UTF-8 entry in {}", dir);
                continue;
            };
            let Ok(path) = dir.join(&name) else {
                continue;
            };
            let metadata = entry.metadata()?;
            let (kind, size) = if metadata.is_dir() {
                (EntryKind::Dir, 0)
            } else {
                (EntryKind::File, metadata.len())
            };
            entries.push(FsEntry { path, kind, size });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    fn path(s: &str) -> FsPath {
        FsPath::new(s).unwrap()
    }

    #[test]
    fn test_create_and_read_back() {
        let root = TempDir::new().unwrap();
        let backend = HostFs::new(root.path());

        let mut w = backend.create(&path("/hello.txt")).unwrap();
        w.write_all(b"hello").unwrap();
        drop(w);

        assert!(backend.exists(&path("/hello.txt")));
        let mut out = Vec::new();
        backend
            .open(&path("/hello.txt"))
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_parent_dirs_option() {
        let root = TempDir::new().unwrap();

        let flat = HostFs::new(root.path());
        assert!(flat.create(&path("/sub/a.txt")).is_err());

        let nested = HostFs::new(root.path()).with_parent_dirs(true);
        nested.create(&path("/sub/a.txt")).unwrap();
        assert!(nested.exists(&path("/sub/a.txt")));

        let listing = nested.read_dir(&FsPath::root()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].path.as_str(), "/sub");
        assert_eq!(listing[0].kind, EntryKind::Dir);

        assert!(nested.open(&path("/sub")).is_err());
    }

    #[test]
    fn test_remove_and_missing_dir() {
        let root = TempDir::new().unwrap();
        let backend = HostFs::new(root.path());
        backend.create(&path("/gone.txt")).unwrap();

        backend.remove(&path("/gone.txt")).unwrap();
        assert!(!backend.exists(&path("/gone.txt")));
        assert_eq!(
            backend.remove(&path("/gone.txt")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(backend.read_dir(&path("/nope")).unwrap().is_empty());
    }

    #[test]
    fn test_listing_a_file_is_empty() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("plain.txt"), b"not a dir").unwrap();
        let backend = HostFs::new(root.path());

        assert!(backend.read_dir(&path("/plain.txt")).unwrap().is_empty());
        assert!(backend.read_dir(&path("/plain.txt/")).unwrap().is_empty());
        assert_eq!(backend.read_dir(&FsPath::root()).unwrap().len(), 1);
    }
}
