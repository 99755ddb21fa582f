//! Filesystem primitives
//!
//! Every engine in this crate talks to the disk through [`FileSystem`].
//! [`StdFs`] is the real implementation; tests wrap it to inject failures
//! (a rename that crosses devices, a delete that is refused, a short write).

use crate::types::{Entry, IoResultExt, Result, TreeError};
use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Primitive operations consumed by the walker and the copy/move engines
pub trait FileSystem: Send + Sync {
    /// List the immediate children of `dir` in a single enumeration.
    ///
    /// Children that disappear between listing and stat are dropped.
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>>;

    /// Stat without following a trailing symlink
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Stat following symlinks
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    fn open_read(&self, path: &Path) -> io::Result<File>;

    /// Create or truncate `path` for writing
    fn create_write(&self, path: &Path) -> io::Result<File>;

    fn create_dir(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a symlink (never its target)
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn set_modified(&self, path: &Path, mtime: SystemTime) -> io::Result<()>;

    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Whether anything (including a dangling symlink) exists at `path`
    fn exists(&self, path: &Path) -> bool {
        self.symlink_metadata(path).is_ok()
    }

    /// Whether `path` resolves to a directory
    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }
}

/// [`FileSystem`] backed by `std::fs` and `filetime`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileSystem for StdFs {
    fn read_dir(&self, dir: &Path) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for item in fs::read_dir(dir).at(dir)? {
            let item = item.at(dir)?;
            let path = item.path();
            match fs::symlink_metadata(&path) {
                Ok(metadata) => entries.push(Entry::from_metadata(path, &metadata)),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} vanished during enumeration", path.display());
                }
                Err(e) => return Err(TreeError::from_io(&path, e)),
            }
        }
        Ok(entries)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        fs::symlink_metadata(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        fs::metadata(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn create_write(&self, path: &Path) -> io::Result<File> {
        File::create(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        remove_link_or_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn set_modified(&self, path: &Path, mtime: SystemTime) -> io::Result<()> {
        filetime::set_file_mtime(path, filetime::FileTime::from_system_time(mtime))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        create_symlink(target, link)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// A single `read`, retried while a signal interrupts it
pub(crate) fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Reading a FIFO or device would block or never end, so only regular
/// files are opened for their content.
pub(crate) fn require_regular_file(path: &Path, metadata: &Metadata) -> Result<()> {
    if metadata.is_file() {
        Ok(())
    } else {
        Err(TreeError::NotARegularFile {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(unix)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

// Directory symlinks on Windows must be removed as directories.
#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(file_err) => fs::remove_dir(path).map_err(|_| file_err),
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    match symlink_file(target, link) {
        Ok(()) => Ok(()),
        Err(file_err) => symlink_dir(target, link).map_err(|_| file_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    /// Fails with `Interrupted` a fixed number of times before each read
    struct Flaky<'a> {
        interruptions: usize,
        data: &'a [u8],
    }

    impl Read for Flaky<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interruptions > 0 {
                self.interruptions -= 1;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_read_chunk_retries_interrupted_reads() {
        let mut reader = Flaky {
            interruptions: 3,
            data: b"payload",
        };
        let mut buf = [0u8; 16];

        let n = read_chunk(&mut reader, &mut buf).expect("read after retries");

        assert_eq!(&buf[..n], b"payload");
        assert_eq!(read_chunk(&mut reader, &mut buf).expect("eof"), 0);
    }

    #[test]
    fn test_read_dir_lists_immediate_children_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub/deeper")).expect("create dirs");
        fs::write(root.join("a.txt"), b"aaa").expect("write a");
        fs::write(root.join("sub/b.txt"), b"b").expect("write b");

        let mut entries = StdFs.read_dir(root).expect("read_dir");
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "a.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].size, 3);
        assert_eq!(entries[1].name(), "sub");
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[test]
    fn test_read_dir_missing_directory_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing");

        let error = StdFs.read_dir(&missing).unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_set_modified_round_trips() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("stamp.txt");
        fs::write(&path, b"x").expect("write file");
        let mtime = UNIX_EPOCH + Duration::from_secs(946_684_800);

        StdFs.set_modified(&path, mtime).expect("set mtime");

        let actual = fs::metadata(&path).and_then(|m| m.modified()).expect("mtime");
        assert_eq!(actual, mtime);
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_file_removes_link_not_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link.txt");
        fs::write(&target, b"payload").expect("write target");
        StdFs.symlink(&target, &link).expect("create symlink");

        StdFs.remove_file(&link).expect("remove link");

        assert!(!StdFs.exists(&link));
        assert!(StdFs.exists(&target));
    }

    #[test]
    #[cfg(unix)]
    fn test_exists_sees_dangling_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let link = temp_dir.path().join("broken");
        StdFs
            .symlink(&temp_dir.path().join("nowhere"), &link)
            .expect("create symlink");

        assert!(StdFs.exists(&link));
        assert!(!StdFs.is_dir(&link));
    }
}
