//! In-memory filesystem.
//!
//! Models a flat flash filesystem: files are keyed by their full path and
//! directories exist only as shared path prefixes.

use std::collections::BTreeMap;
use std::io::{self, Cursor, ErrorKind, Write};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{EntryKind, FileSystem, FsEntry};
use crate::path::FsPath;

type FileMap = BTreeMap<String, Vec<u8>>;

/// In-memory [`FileSystem`]. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: Arc<RwLock<FileMap>>,
}

impl MemoryFs {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a file, replacing any existing content.
    pub fn insert(&self, path: &str, contents: &[u8]) {
        self.write_files()
            .insert(path.to_string(), contents.to_vec());
    }

    /// Contents of the file at `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.read_files().get(path).cloned()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.read_files().len()
    }

    /// True if no files are stored.
    pub fn is_empty(&self) -> bool {
        self.read_files().is_empty()
    }

    fn read_files(&self) -> RwLockReadGuard<'_, FileMap> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_files(&self) -> RwLockWriteGuard<'_, FileMap> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_dir(files: &FileMap, path: &FsPath) -> bool {
        if path.is_root() {
            return true;
        }
        let prefix = format!("{}/", path.as_str().trim_end_matches('/'));
        files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }
}

impl FileSystem for MemoryFs {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemoryWriter;

    fn exists(&self, path: &FsPath) -> bool {
        let files = self.read_files();
        files.contains_key(path.as_str()) || Self::is_dir(&files, path)
    }

    fn open(&self, path: &FsPath) -> io::Result<Self::Reader> {
        self.read_files()
            .get(path.as_str())
            .cloned()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, path.to_string()))
    }

    fn create(&self, path: &FsPath) -> io::Result<Self::Writer> {
        if path.is_dir_marker() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("cannot create a file at directory path {}", path),
            ));
        }
        self.write_files().insert(path.to_string(), Vec::new());
        Ok(MemoryWriter {
            files: Arc::clone(&self.files),
            path: path.to_string(),
        })
    }

    fn remove(&self, path: &FsPath) -> io::Result<()> {
        let mut files = self.write_files();
        if files.remove(path.as_str()).is_some() {
            return Ok(());
        }
        if Self::is_dir(&files, path) {
            return Err(io::Error::new(
                ErrorKind::Other,
                format!("directory not empty: {}", path),
            ));
        }
        Err(io::Error::new(ErrorKind::NotFound, path.to_string()))
    }

    fn read_dir(&self, dir: &FsPath) -> io::Result<Vec<FsEntry>> {
        let files = self.read_files();
        let mut entries: Vec<FsEntry> = Vec::new();

        for (key, contents) in files.iter() {
            let Ok(path) = FsPath::new(key) else {
                continue;
            };
            let Some(rest) = path.relative_to(dir) else {
                continue;
            };

            match rest.split_once('/') {
                None => entries.push(FsEntry {
                    path,
                    kind: EntryKind::File,
                    size: contents.len() as u64,
                }),
                Some((child, _)) => {
                    let child = dir.join(child).map_err(|e| {
                        io::Error::new(ErrorKind::InvalidData, e.to_string())
                    })?;
                    // Keys sharing a prefix are contiguous in a BTreeMap.
                    if entries.last().map(|e| &e.path) != Some(&child) {
                        entries.push(FsEntry {
                            path: child,
                            kind: EntryKind::Dir,
                            size: 0,
                        });
                    }
                }
            }
        }

        Ok(entries)
    }
}

/// Write handle into a [`MemoryFs`]. Bytes are visible as soon as written.
#[derive(Debug)]
pub struct MemoryWriter {
    files: Arc<RwLock<FileMap>>,
    path: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn path(s: &str) -> FsPath {
        FsPath::new(s).unwrap()
    }

    #[test]
    fn test_create_write_read() {
        let fs = MemoryFs::new();
        let mut w = fs.create(&path("/a.txt")).unwrap();
        w.write_all(b"ab").unwrap();
        w.write_all(b"cd").unwrap();
        drop(w);

        let mut out = String::new();
        fs.open(&path("/a.txt"))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "abcd");
    }

    #[test]
    fn test_create_truncates() {
        let fs = MemoryFs::new();
        fs.insert("/a.txt", b"old content");
        let mut w = fs.create(&path("/a.txt")).unwrap();
        w.write_all(b"new").unwrap();
        assert_eq!(fs.contents("/a.txt").unwrap(), b"new");
    }

    #[test]
    fn test_implicit_directories() {
        let fs = MemoryFs::new();
        fs.insert("/css/style.css", b"body{}");
        fs.insert("/css/print.css", b"");
        fs.insert("/index.htm", b"<html>");

        assert!(fs.exists(&path("/css")));
        assert!(fs.exists(&path("/css/")));
        assert!(!fs.exists(&path("/cs")));

        let root = fs.read_dir(&FsPath::root()).unwrap();
        let names: Vec<(&str, EntryKind)> =
            root.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![("/css", EntryKind::Dir), ("/index.htm", EntryKind::File)]
        );

        let css = fs.read_dir(&path("/css")).unwrap();
        assert_eq!(css.len(), 2);
        assert_eq!(css[0].path.as_str(), "/css/print.css");
        assert_eq!(css[1].size, 6);

        assert!(fs.read_dir(&path("/missing")).unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let fs = MemoryFs::new();
        fs.insert("/d/f.txt", b"x");
        assert!(fs.remove(&path("/d")).is_err());
        fs.remove(&path("/d/f.txt")).unwrap();
        assert!(!fs.exists(&path("/d")));
        assert_eq!(
            fs.remove(&path("/d/f.txt")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
