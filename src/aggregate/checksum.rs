//! Streaming checksum accumulation

use crate::fs::{read_chunk, require_regular_file, FileSystem};
use crate::types::{Entry, IoResultExt, Result, TreeError};
use crate::walker::{walk, Visitor, WalkControl, WalkOptions};
use std::path::Path;
use tracing::debug;

/// Stream the file in 64KB chunks
const CHUNK_SIZE: usize = 64 * 1024;

/// Caller-supplied streaming checksum
pub trait Checksum {
    type Output;

    fn update(&mut self, bytes: &[u8]);

    /// Value over every byte fed so far; does not reset the state
    fn value(&self) -> Self::Output;
}

impl Checksum for blake3::Hasher {
    type Output = blake3::Hash;

    fn update(&mut self, bytes: &[u8]) {
        blake3::Hasher::update(self, bytes);
    }

    fn value(&self) -> blake3::Hash {
        self.finalize()
    }
}

/// Whether a directory argument is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumScope {
    /// Only a single file; a directory is an error
    #[default]
    File,
    /// A directory is the concatenation of its regular files in pre-order
    Tree,
}

/// Feed the bytes at `path` into `checksum` and return its value.
///
/// The accumulator is not reset, so feeding two files in sequence yields the
/// checksum of their concatenation.
pub fn checksum_of<C: Checksum>(
    fs: &dyn FileSystem,
    path: &Path,
    checksum: &mut C,
    scope: ChecksumScope,
) -> Result<C::Output> {
    let metadata = fs.metadata(path).at(path)?;
    if metadata.is_dir() {
        if scope == ChecksumScope::File {
            return Err(TreeError::IsADirectory {
                path: path.to_path_buf(),
            });
        }
        let mut visitor = ChecksumVisitor { fs, checksum };
        walk(fs, path, &WalkOptions::new(), &mut visitor)?;
    } else {
        require_regular_file(path, &metadata)?;
        feed_file(fs, path, checksum)?;
    }
    Ok(checksum.value())
}

struct ChecksumVisitor<'a, C: Checksum> {
    fs: &'a dyn FileSystem,
    checksum: &'a mut C,
}

impl<C: Checksum> Visitor for ChecksumVisitor<'_, C> {
    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl> {
        if entry.is_file() {
            let metadata = self.fs.metadata(&entry.path).at(&entry.path)?;
            if metadata.is_file() {
                feed_file(self.fs, &entry.path, self.checksum)?;
            } else {
                debug!("Not hashing special file {}", entry.path.display());
            }
        }
        Ok(WalkControl::Continue)
    }
}

fn feed_file<C: Checksum>(fs: &dyn FileSystem, path: &Path, checksum: &mut C) -> Result<()> {
    let mut file = fs.open_read(path).at(path)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = read_chunk(&mut file, &mut buffer).at(path)?;
        if bytes_read == 0 {
            break;
        }
        checksum.update(&buffer[..bytes_read]);
    }
    Ok(())
}
