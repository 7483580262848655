//! Filesystem capability.
//!
//! The endpoints never touch a concrete filesystem; they are handed one
//! that implements [`FileSystem`]:
//! - [`MemoryFs`] keeps files in memory (tests, demos)
//! - [`HostFs`] maps paths under a directory with `std::fs` (Linux, and
//!   ESP32 where SPIFFS is mounted into the ESP-IDF VFS)
//!
//! All methods are synchronous to support embedded platforms.

mod host;
mod memory;

pub use host::HostFs;
pub use memory::{MemoryFs, MemoryWriter};

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::path::FsPath;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    /// Full path of the entry.
    pub path: FsPath,
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

/// Abstract filesystem access.
pub trait FileSystem: Send + Sync {
    /// Read handle returned by [`FileSystem::open`].
    type Reader: Read + Send + 'static;

    /// Write handle returned by [`FileSystem::create`]. Dropping it closes
    /// the file.
    type Writer: Write + Send + 'static;

    /// True if a file or directory exists at `path`.
    fn exists(&self, path: &FsPath) -> bool;

    /// Open a file for reading.
    fn open(&self, path: &FsPath) -> io::Result<Self::Reader>;

    /// Create a file for writing, truncating any existing content.
    fn create(&self, path: &FsPath) -> io::Result<Self::Writer>;

    /// Remove a file (or an empty directory).
    fn remove(&self, path: &FsPath) -> io::Result<()>;

    /// List the immediate entries of `dir`, in the filesystem's own order.
    ///
    /// A directory that does not exist lists as empty, and so does a path
    /// naming a file.
    fn read_dir(&self, dir: &FsPath) -> io::Result<Vec<FsEntry>>;
}

/// Format a byte count for humans: `512B`, `1.50KB`, `2.00MB`, `1.00GB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2}KB", value / KIB)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2}MB", value / KIB / KIB)
    } else {
        format!("{:.2}GB", value / KIB / KIB / KIB)
    }
}

/// Log every entry at the filesystem root with its size.
pub fn log_inventory<F: FileSystem>(fs: &F) -> io::Result<usize> {
    let entries = fs.read_dir(&FsPath::root())?;
    for entry in &entries {
        match entry.kind {
            EntryKind::File => {
                tracing::info!("FS File: {}, size: {}", entry.path, format_bytes(entry.size))
            }
            EntryKind::Dir => tracing::info!("FS Dir:  {}", entry.path),
        }
    }
    Ok(entries.len())
}
