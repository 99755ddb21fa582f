//! Single-file and symlink copy

use super::CopyOptions;
use crate::containment;
use crate::fs::{read_chunk, require_regular_file, FileSystem};
use crate::types::{IoResultExt, Result, TreeError};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Copy one file, verifying the destination length afterwards.
///
/// 1. Reject directories on either side, non-regular sources (FIFOs,
///    sockets, devices) and copying a file onto itself
/// 2. Stream from `src` into `dest` (parents are created)
/// 3. Compare the reported lengths of both files
/// 4. Optionally stamp `dest` with the source modification time
///
/// On a length mismatch the destination is left in place and
/// `IncompleteTransfer` is returned.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
///
/// # Example
/// ```no_run
/// use treeops::copy::{copy_file, CopyOptions};
/// use treeops::fs::StdFs;
/// use std::path::Path;
///
/// let bytes = copy_file(
///     &StdFs,
///     Path::new("source.txt"),
///     Path::new("dest.txt"),
///     &CopyOptions::default(),
/// )?;
/// # Ok::<(), treeops::TreeError>(())
/// ```
pub fn copy_file(
    fs: &dyn FileSystem,
    src: &Path,
    dest: &Path,
    options: &CopyOptions,
) -> Result<u64> {
    let src_metadata = fs.metadata(src).at(src)?;
    if src_metadata.is_dir() {
        return Err(TreeError::IsADirectory {
            path: src.to_path_buf(),
        });
    }
    require_regular_file(src, &src_metadata)?;
    if fs.is_dir(dest) {
        return Err(TreeError::IsADirectory {
            path: dest.to_path_buf(),
        });
    }
    containment::check_identity(fs, src, dest)?;

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs.create_dir_all(parent).at(parent)?;
        }
    }

    let total_bytes = stream(fs, src, dest, options.buffer_size)?;

    let expected = src_metadata.len();
    let actual = fs.metadata(dest).at(dest)?.len();
    if actual != expected {
        return Err(TreeError::IncompleteTransfer {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            expected,
            actual,
        });
    }

    if options.preserve_timestamps {
        let mtime = src_metadata.modified().at(src)?;
        fs.set_modified(dest, mtime).at(dest)?;
    }

    debug!("Copied {} -> {} ({} bytes)", src.display(), dest.display(), total_bytes);
    Ok(total_bytes)
}

/// Both handles are closed before this returns, on every path.
fn stream(fs: &dyn FileSystem, src: &Path, dest: &Path, buffer_size: usize) -> Result<u64> {
    let mut src_file = fs.open_read(src).at(src)?;
    let mut dest_file = fs.create_write(dest).at(dest)?;

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = read_chunk(&mut src_file, &mut buffer).at(src)?;
        if bytes_read == 0 {
            break;
        }
        dest_file.write_all(&buffer[..bytes_read]).at(dest)?;
        total_bytes += bytes_read as u64;
    }

    dest_file.sync_all().at(dest)?;
    Ok(total_bytes)
}

/// Recreate the link at `src` as a link at `dest`, never touching its target.
///
/// A file or link already at `dest` is replaced.
pub(crate) fn copy_symlink(fs: &dyn FileSystem, src: &Path, dest: &Path) -> Result<()> {
    if let Ok(existing) = fs.symlink_metadata(dest) {
        if existing.is_dir() {
            return Err(TreeError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }
        fs.remove_file(dest).at(dest)?;
    }

    let target = fs.read_link(src).at(src)?;
    fs.symlink(&target, dest).at(dest)?;
    debug!("Linked {} -> {}", dest.display(), target.display());
    Ok(())
}
