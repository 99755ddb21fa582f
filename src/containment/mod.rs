//! Containment checks run before any copy or move mutates the disk

use crate::fs::FileSystem;
use crate::types::{Containment, IoResultExt, Result, TreeError};
use std::path::{Path, PathBuf};

/// Reject a destination equal to or nested inside `source`.
///
/// Both paths are resolved through symlinks first. A destination that does
/// not exist yet is resolved through its deepest existing ancestor.
/// Reverse nesting (source inside destination) is allowed.
pub fn check(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
    let from = normalize(fs.canonicalize(source).at(source)?);
    let to = normalize(resolve(fs, destination)?);

    let reason = if to == from {
        Containment::Identical
    } else if to.starts_with(&from) {
        Containment::Nested
    } else {
        return Ok(());
    };

    Err(TreeError::SelfReference {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        reason,
    })
}

/// Reject only the case where both paths name the same object
pub fn check_identity(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
    let from = normalize(fs.canonicalize(source).at(source)?);
    let to = normalize(resolve(fs, destination)?);

    if from == to {
        return Err(TreeError::SelfReference {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            reason: Containment::Identical,
        });
    }
    Ok(())
}

/// Canonicalize a path that may not exist yet
fn resolve(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        match fs.canonicalize(existing) {
            Ok(resolved) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(resolved, |acc: PathBuf, part| acc.join(part)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(TreeError::from_io(path, e));
                };
                missing.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            Err(e) => return Err(TreeError::from_io(path, e)),
        }
    }
}

#[cfg(any(windows, target_os = "macos"))]
fn normalize(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(any(windows, target_os = "macos")))]
fn normalize(path: PathBuf) -> PathBuf {
    path
}
