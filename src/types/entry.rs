//! Entry - one filesystem object encountered during traversal

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of a filesystem object, as seen without following links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    /// Classify `lstat`-style metadata. Anything that is neither a directory
    /// nor a symlink (pipes, sockets, devices) is reported as a file; the
    /// operations that read content check for a regular file first.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
            EntryKind::Symlink => "link",
        }
    }
}

/// A single object produced during traversal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Full path (the walk root joined with the relative location)
    pub path: PathBuf,

    /// Kind of object (symlinks are never resolved)
    pub kind: EntryKind,

    /// Size in bytes; 0 for directories, link length for symlinks
    pub size: u64,

    /// Last modification time
    pub modified: SystemTime,

    /// Distance from the walk root (root's children are depth 1)
    pub depth: usize,
}

impl Entry {
    /// Create a new Entry with the given parameters
    pub fn new(path: PathBuf, kind: EntryKind, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            kind,
            size,
            modified,
            depth: 0,
        }
    }

    /// Build an entry from metadata obtained with `symlink_metadata`.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let kind = EntryKind::from_metadata(metadata);
        let size = match kind {
            EntryKind::Directory => 0,
            _ => metadata.len(),
        };
        // Some platforms cannot report mtime; treat it as the epoch.
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Self::new(path, kind, size, modified)
    }

    /// Set the traversal depth of this entry
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Final path component, or the whole path when there is none (`/`, `..`)
    pub fn name(&self) -> &OsStr {
        self.path
            .file_name()
            .unwrap_or_else(|| self.path.as_os_str())
    }

    /// Path relative to `root`, or the full path when it is not under `root`
    pub fn relative_to(&self, root: &Path) -> &Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}
