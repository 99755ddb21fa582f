//! Tree deletion and directory creation helpers

use crate::fs::FileSystem;
use crate::types::{Entry, IoResultExt, Result, TreeError};
use crate::walker::{walk, TraversalOrder, Visitor, WalkControl, WalkOptions};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Removes every visited entry; driven in post-order so directories are
/// already empty when their turn comes.
struct Teardown<'a> {
    fs: &'a dyn FileSystem,
    removed: &'a mut usize,
}

impl Visitor for Teardown<'_> {
    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl> {
        if entry.is_dir() {
            self.fs.remove_dir(&entry.path).at(&entry.path)?;
        } else {
            self.fs.remove_file(&entry.path).at(&entry.path)?;
        }
        *self.removed += 1;
        Ok(WalkControl::Continue)
    }
}

fn teardown_options() -> WalkOptions {
    WalkOptions::new()
        .include_dirs(true)
        .order(TraversalOrder::PostOrder)
}

/// Delete everything under `dir`, then `dir` itself.
///
/// `removed` counts the entries actually deleted, so a caller can tell an
/// untouched tree from a half-deleted one when this fails.
pub(crate) fn remove_tree(fs: &dyn FileSystem, dir: &Path, removed: &mut usize) -> Result<()> {
    walk(
        fs,
        dir,
        &teardown_options(),
        &mut Teardown {
            fs,
            removed: &mut *removed,
        },
    )?;
    fs.remove_dir(dir).at(dir)?;
    *removed += 1;
    Ok(())
}

/// Delete a directory recursively. A missing directory is not an error.
///
/// A symlink to a directory is unlinked; its target is left alone.
pub fn delete_directory(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    let metadata = match fs.symlink_metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(TreeError::from_io(dir, e)),
    };

    if metadata.file_type().is_symlink() && fs.is_dir(dir) {
        debug!("Unlinking directory symlink {}", dir.display());
        return fs.remove_file(dir).at(dir);
    }
    if !metadata.is_dir() {
        return Err(TreeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut removed = 0;
    remove_tree(fs, dir, &mut removed)?;
    debug!("Deleted {} ({} entries)", dir.display(), removed);
    Ok(())
}

/// Delete the contents of `dir`, keeping the directory itself
pub fn clean_directory(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    let mut removed = 0;
    walk(
        fs,
        dir,
        &teardown_options(),
        &mut Teardown {
            fs,
            removed: &mut removed,
        },
    )?;
    debug!("Cleaned {} ({} entries)", dir.display(), removed);
    Ok(())
}

/// Delete a file, symlink or directory tree. A missing path is `NotFound`.
pub fn force_delete(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    let metadata = fs.symlink_metadata(path).at(path)?;
    if metadata.is_dir() {
        delete_directory(fs, path)
    } else {
        fs.remove_file(path).at(path)
    }
}

/// Delete without reporting failures.
///
/// Failures are logged and discarded; the return value says whether
/// nothing is left at `path`.
pub fn delete_quietly(fs: &dyn FileSystem, path: &Path) -> bool {
    match force_delete(fs, path) {
        Ok(()) => true,
        Err(e) if e.is_not_found() => true,
        Err(e) => {
            warn!("Ignoring failure to delete {}: {}", path.display(), e);
            !fs.exists(path)
        }
    }
}

/// Create `dir` and any missing parents; an existing directory is fine.
pub fn force_mkdir(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    if fs.exists(dir) {
        if fs.is_dir(dir) {
            return Ok(());
        }
        return Err(TreeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    fs.create_dir_all(dir).at(dir)
}
