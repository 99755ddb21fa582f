//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use treeops::fs::{FileSystem, StdFs};
use treeops::{Entry, Result};

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(path, content).expect("Failed to write test file");
}

/// Fixed whole-second timestamp so comparisons are exact on every filesystem
pub fn past_time(offset_secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_600_000_000 + offset_secs)
}

pub fn set_mtime(path: &Path, mtime: SystemTime) {
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(mtime))
        .expect("Failed to set mtime");
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .expect("Failed to read mtime")
}

/// Sorted relative paths of everything under `root` (std-only inventory)
pub fn inventory(root: &Path) -> Vec<String> {
    fn visit(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).expect("read_dir") {
            let path = entry.expect("dir entry").path();
            let relative = path
                .strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/");
            out.push(relative);
            let is_real_dir = fs::symlink_metadata(&path)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_real_dir {
                visit(&path, root, out);
            }
        }
    }
    let mut out = Vec::new();
    visit(root, root, &mut out);
    out.sort();
    out
}

/// [`FileSystem`] wrapper that injects failures:
/// - `fail_rename`: every rename fails with this error kind
/// - `deny_remove_under`: deleting anything under this prefix fails
/// - `short_writes_into`: writes go to this sink, leaving the real
///   destination empty
#[derive(Default)]
pub struct FaultyFs {
    inner: StdFs,
    pub fail_rename: Option<io::ErrorKind>,
    pub deny_remove_under: Option<PathBuf>,
    pub short_writes_into: Option<PathBuf>,
}

impl FaultyFs {
    /// Renames fail as they do between two mounted volumes
    pub fn cross_device() -> Self {
        Self::rename_fails_with(io::ErrorKind::CrossesDevices)
    }

    pub fn rename_fails_with(kind: io::ErrorKind) -> Self {
        Self {
            fail_rename: Some(kind),
            ..Self::default()
        }
    }

    pub fn deny_remove_under(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.deny_remove_under = Some(prefix.into());
        self
    }

    pub fn short_writes_into(mut self, sink: impl Into<PathBuf>) -> Self {
        self.short_writes_into = Some(sink.into());
        self
    }

    fn check_remove(&self, path: &Path) -> io::Result<()> {
        match &self.deny_remove_under {
            Some(prefix) if path.starts_with(prefix) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected delete failure",
            )),
            _ => Ok(()),
        }
    }
}

impl FileSystem for FaultyFs {
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>> {
        self.inner.read_dir(dir)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        self.inner.symlink_metadata(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        self.inner.metadata(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<File> {
        self.inner.open_read(path)
    }

    fn create_write(&self, path: &Path) -> io::Result<File> {
        match &self.short_writes_into {
            Some(sink) => {
                File::create(path)?;
                File::create(sink)
            }
            None => self.inner.create_write(path),
        }
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check_remove(path)?;
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        self.check_remove(path)?;
        self.inner.remove_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(kind) = self.fail_rename {
            return Err(io::Error::new(kind, "injected rename failure"));
        }
        self.inner.rename(from, to)
    }

    fn set_modified(&self, path: &Path, mtime: SystemTime) -> io::Result<()> {
        self.inner.set_modified(path, mtime)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.read_link(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.inner.symlink(target, link)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.inner.canonicalize(path)
    }
}
