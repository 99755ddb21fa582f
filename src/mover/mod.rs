//! Move engine
//!
//! Every move tries an atomic rename first. When the rename would cross
//! devices the source is copied and then deleted; any other rename failure
//! is returned as is. If the delete fails the fresh copy is removed again,
//! so the caller sees the move either fully applied or not applied at all.
//!
//! The parent of the destination must already exist. Only the
//! `*_to_directory` variants create directories, and only when asked.
//!
//! ```text
//! Start -> TryRename -> Success
//!              |
//!              v
//!          Copy -> DeleteSource -> Success
//!            |          |
//!            v          v
//!     remove partial   RollbackCopy -> Fail
//! ```

use crate::containment;
use crate::copy::{copy_directory, copy_file, copy_symlink, destination_in, CopyOptions};
use crate::delete::remove_tree;
use crate::fs::FileSystem;
use crate::types::{IoResultExt, Result, TreeError};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Move a file (or a symlink, which stays a link) to `dest`.
///
/// `dest` must not exist; its parent must.
pub fn move_file(fs: &dyn FileSystem, src: &Path, dest: &Path) -> Result<()> {
    let metadata = fs.symlink_metadata(src).at(src)?;
    if metadata.is_dir() {
        return Err(TreeError::IsADirectory {
            path: src.to_path_buf(),
        });
    }
    reject_existing(fs, dest)?;
    require_parent(fs, dest)?;

    if try_rename(fs, src, dest)? {
        info!("Moved {} -> {}", src.display(), dest.display());
        return Ok(());
    }

    let copied = if metadata.file_type().is_symlink() {
        copy_symlink(fs, src, dest)
    } else {
        copy_file(fs, src, dest, &CopyOptions::default()).map(|_| ())
    };
    if let Err(e) = copied {
        discard_partial(fs, dest);
        return Err(e);
    }

    if let Err(cause) = fs.remove_file(src).at(src) {
        debug!("Deleting {} failed, rolling back {}", src.display(), dest.display());
        if let Err(e) = fs.remove_file(dest) {
            warn!("Rollback of {} failed: {}", dest.display(), e);
        }
        return Err(TreeError::MoveRolledBack {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            cause: Box::new(cause),
        });
    }

    info!("Moved {} -> {} (copy and delete)", src.display(), dest.display());
    Ok(())
}

/// Move a directory tree to `dest`.
///
/// `dest` must not exist; an existing directory is a conflict, never a
/// merge target. Its parent must exist. Moving a directory into its own subtree is rejected
/// before anything is touched.
///
/// If the source cannot be deleted after a complete copy and nothing of it
/// was removed yet, the copy is rolled back (`MoveRolledBack`). If part of
/// the source is already gone the copy is kept (`MoveIncomplete`), since it
/// then holds the only full version of the data.
pub fn move_directory(fs: &dyn FileSystem, src: &Path, dest: &Path) -> Result<()> {
    let metadata = fs.symlink_metadata(src).at(src)?;
    if !metadata.is_dir() {
        return Err(TreeError::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    reject_existing(fs, dest)?;
    containment::check(fs, src, dest)?;
    require_parent(fs, dest)?;

    if try_rename(fs, src, dest)? {
        info!("Moved {} -> {}", src.display(), dest.display());
        return Ok(());
    }

    if let Err(e) = copy_directory(fs, src, dest, None, &CopyOptions::default(), None) {
        discard_partial(fs, dest);
        return Err(e);
    }

    let mut removed = 0;
    if let Err(cause) = remove_tree(fs, src, &mut removed) {
        let cause = Box::new(cause);
        if removed == 0 {
            debug!("Deleting {} failed, rolling back {}", src.display(), dest.display());
            let mut rolled_back = 0;
            if let Err(e) = remove_tree(fs, dest, &mut rolled_back) {
                warn!("Rollback of {} failed: {}", dest.display(), e);
            }
            return Err(TreeError::MoveRolledBack {
                from: src.to_path_buf(),
                to: dest.to_path_buf(),
                cause,
            });
        }
        warn!(
            "{} entries of {} were deleted before failing; keeping {}",
            removed,
            src.display(),
            dest.display()
        );
        return Err(TreeError::MoveIncomplete {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            cause,
        });
    }

    info!("Moved {} -> {} (copy and delete)", src.display(), dest.display());
    Ok(())
}

/// Move a file into `dir`, keeping its name
pub fn move_file_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    create_destination_parents: bool,
) -> Result<()> {
    if fs.symlink_metadata(src).at(src)?.is_dir() {
        return Err(TreeError::IsADirectory {
            path: src.to_path_buf(),
        });
    }
    let dest = destination_in(dir, src)?;
    prepare_target(fs, dir, create_destination_parents)?;
    move_file(fs, src, &dest)
}

/// Move a directory into `dir` as a new child of the same name
pub fn move_directory_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    create_destination_parents: bool,
) -> Result<()> {
    if !fs.symlink_metadata(src).at(src)?.is_dir() {
        return Err(TreeError::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    let dest = destination_in(dir, src)?;
    validate_target(fs, dir, create_destination_parents)?;
    // Before creating `dir`, which may itself lie inside `src`.
    containment::check(fs, src, &dest)?;
    prepare_target(fs, dir, create_destination_parents)?;
    move_directory(fs, src, &dest)
}

/// Move a file or directory into `dir`, dispatching on the source kind
pub fn move_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    create_destination_parents: bool,
) -> Result<()> {
    if fs.symlink_metadata(src).at(src)?.is_dir() {
        move_directory_to_directory(fs, src, dir, create_destination_parents)
    } else {
        move_file_to_directory(fs, src, dir, create_destination_parents)
    }
}

fn reject_existing(fs: &dyn FileSystem, dest: &Path) -> Result<()> {
    if fs.exists(dest) {
        return Err(TreeError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// `Ok(false)` when the rename crossed devices and copy-and-delete applies
fn try_rename(fs: &dyn FileSystem, src: &Path, dest: &Path) -> Result<bool> {
    match fs.rename(src, dest) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Rename {} -> {} crosses devices, falling back to copy and delete",
                src.display(),
                dest.display()
            );
            Ok(false)
        }
        Err(e) => Err(TreeError::from_io(src, e)),
    }
}

fn require_parent(fs: &dyn FileSystem, dest: &Path) -> Result<()> {
    let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !fs.exists(parent) {
        return Err(TreeError::NotFound {
            path: parent.to_path_buf(),
        });
    }
    if !fs.is_dir(parent) {
        return Err(TreeError::NotADirectory {
            path: parent.to_path_buf(),
        });
    }
    Ok(())
}

/// Remove whatever a failed fallback copy left behind
fn discard_partial(fs: &dyn FileSystem, dest: &Path) {
    let Ok(metadata) = fs.symlink_metadata(dest) else {
        return;
    };
    let result = if metadata.is_dir() {
        let mut removed = 0;
        remove_tree(fs, dest, &mut removed)
    } else {
        fs.remove_file(dest).at(dest)
    };
    if let Err(e) = result {
        warn!("Could not remove partial copy {}: {}", dest.display(), e);
    }
}

fn validate_target(fs: &dyn FileSystem, dir: &Path, create: bool) -> Result<()> {
    if fs.exists(dir) {
        if !fs.is_dir(dir) {
            return Err(TreeError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
    } else if !create {
        return Err(TreeError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

fn prepare_target(fs: &dyn FileSystem, dir: &Path, create: bool) -> Result<()> {
    validate_target(fs, dir, create)?;
    if !fs.exists(dir) {
        fs.create_dir_all(dir).at(dir)?;
        debug!("Created target directory {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFs;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_move_file_same_volume_renames() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.txt");
        let dest = temp_dir.path().join("b.txt");
        fs::write(&src, b"payload").expect("write src");

        move_file(&StdFs, &src, &dest).expect("move");

        assert!(!src.exists());
        assert_eq!(fs::read(&dest).expect("read dest"), b"payload");
    }

    #[test]
    fn test_move_file_rejects_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.txt");
        let dest = temp_dir.path().join("b.txt");
        fs::write(&src, b"new").expect("write src");
        fs::write(&dest, b"old").expect("write dest");

        let error = move_file(&StdFs, &src, &dest).unwrap_err();

        assert!(matches!(error, TreeError::AlreadyExists { .. }));
        assert_eq!(fs::read(&dest).expect("read dest"), b"old");
        assert!(src.exists());
    }

    #[test]
    fn test_move_directory_into_own_subtree_is_rejected_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("create src");
        fs::write(src.join("f.txt"), b"f").expect("write f");

        let error = move_directory(&StdFs, &src, &src.join("inner")).unwrap_err();

        assert!(error.is_self_reference());
        assert!(src.join("f.txt").exists());
        assert!(!src.join("inner").exists());
    }

    #[test]
    fn test_move_directory_to_directory_checks_containment_before_creating() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("create src");
        let target = src.join("new/target");

        let error = move_directory_to_directory(&StdFs, &src, &target, true).unwrap_err();

        assert!(error.is_self_reference());
        assert!(!src.join("new").exists());
    }

    #[test]
    fn test_move_file_to_directory_missing_source_creates_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("new/target");

        let error = move_file_to_directory(
            &StdFs,
            &temp_dir.path().join("missing.txt"),
            &target,
            true,
        )
        .unwrap_err();

        assert!(error.is_not_found());
        assert!(!temp_dir.path().join("new").exists());
    }

    #[test]
    fn test_move_file_requires_destination_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.txt");
        fs::write(&src, b"payload").expect("write src");
        let missing_parent = temp_dir.path().join("absent");

        let error = move_file(&StdFs, &src, &missing_parent.join("b.txt")).unwrap_err();

        assert!(matches!(error, TreeError::NotFound { ref path } if *path == missing_parent));
        assert!(src.exists());
        assert!(!missing_parent.exists());
    }
}
