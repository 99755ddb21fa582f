//! Visitors that fold a traversal into a single result

mod checksum;

pub use checksum::{checksum_of, Checksum, ChecksumScope};

use crate::fs::FileSystem;
use crate::types::{Entry, IoResultExt, Result, TreeError};
use crate::walker::{walk, Visitor, WalkControl, WalkOptions};
use std::path::Path;

/// Collects every visited entry in traversal order
#[derive(Debug, Default)]
pub struct ListVisitor {
    pub entries: Vec<Entry>,
}

impl Visitor for ListVisitor {
    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl> {
        self.entries.push(entry.clone());
        Ok(WalkControl::Continue)
    }
}

/// Walk `root` eagerly and return the ordered entries.
pub fn list(fs: &dyn FileSystem, root: &Path, options: &WalkOptions) -> Result<Vec<Entry>> {
    let mut visitor = ListVisitor::default();
    walk(fs, root, options, &mut visitor)?;
    Ok(visitor.entries)
}

/// Sums the sizes of regular files. Symlinks and directories add nothing.
#[derive(Debug, Default)]
pub struct SizeVisitor {
    pub total: u64,
    pub files: usize,
}

impl Visitor for SizeVisitor {
    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl> {
        if entry.is_file() {
            self.total = self.total.saturating_add(entry.size);
            self.files += 1;
        }
        Ok(WalkControl::Continue)
    }
}

/// Size of a file, or the total size of the regular files under a directory.
///
/// A missing path is an error, never zero.
pub fn size_of(fs: &dyn FileSystem, path: &Path) -> Result<u64> {
    let metadata = fs.metadata(path).at(path)?;
    if metadata.is_dir() {
        size_of_directory(fs, path)
    } else {
        Ok(metadata.len())
    }
}

/// Total size of the regular files under `dir`; `dir` must be a directory.
pub fn size_of_directory(fs: &dyn FileSystem, dir: &Path) -> Result<u64> {
    if !fs.exists(dir) {
        return Err(TreeError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut visitor = SizeVisitor::default();
    walk(fs, dir, &WalkOptions::new(), &mut visitor)?;
    Ok(visitor.total)
}
