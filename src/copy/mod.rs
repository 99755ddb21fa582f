//! Copy engine: verified single-file copy and filtered directory mirroring

mod file;

pub use file::copy_file;
pub(crate) use file::copy_symlink;

use crate::containment;
use crate::filter::{AcceptAll, FilterPair, PathFilter};
use crate::fs::FileSystem;
use crate::types::{Entry, IoResultExt, Result, TreeError};
use crate::walker::{walk, Visitor, WalkControl, WalkOptions};
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Progress callback: (files copied, bytes copied)
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Default copy buffer: 128KB
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Parameters shared by every copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Stamp copies with the source modification time
    pub preserve_timestamps: bool,
    pub buffer_size: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CopyOptions {
    pub fn preserve_timestamps(mut self, preserve: bool) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

/// What a directory copy produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub directories: u64,
    pub symlinks: u64,
    pub bytes: u64,
    /// FIFOs, sockets and devices, which have no content to copy
    pub skipped: u64,
}

impl AddAssign for CopyStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.directories += other.directories;
        self.symlinks += other.symlinks;
        self.bytes += other.bytes;
        self.skipped += other.skipped;
    }
}

/// Mirror the tree under `src` into `dest`.
///
/// `filter` decides both which subdirectories are entered and which entries
/// are copied; `None` copies everything. An existing destination directory
/// is merged into. Symlinks are recreated, never followed.
///
/// Directory timestamps are applied only after all content is in place,
/// deepest first, since populating a directory bumps its mtime.
///
/// A failure partway leaves whatever was already copied in place.
pub fn copy_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dest: &Path,
    filter: Option<Arc<dyn PathFilter>>,
    options: &CopyOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<CopyStats> {
    let src_metadata = fs.metadata(src).at(src)?;
    if !src_metadata.is_dir() {
        return Err(TreeError::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    containment::check(fs, src, dest)?;

    if fs.exists(dest) && !fs.is_dir(dest) {
        return Err(TreeError::NotADirectory {
            path: dest.to_path_buf(),
        });
    }
    fs.create_dir_all(dest).at(dest)?;

    let filter = filter.unwrap_or_else(|| Arc::new(AcceptAll) as Arc<dyn PathFilter>);
    let walk_options = WalkOptions::new()
        .filters(FilterPair::uniform(filter))
        .include_dirs(true);

    let mut visitor = CopyVisitor {
        fs,
        src,
        dest,
        options,
        on_progress,
        stats: CopyStats::default(),
        directories: Vec::new(),
    };
    walk(fs, src, &walk_options, &mut visitor)?;

    let CopyVisitor {
        stats, directories, ..
    } = visitor;

    if options.preserve_timestamps {
        // Pre-order reversed: every directory comes after all of its descendants.
        for (path, mtime) in directories.iter().rev() {
            fs.set_modified(path, *mtime).at(path)?;
        }
        let mtime = src_metadata.modified().at(src)?;
        fs.set_modified(dest, mtime).at(dest)?;
    }

    info!(
        "Copied {} -> {}: {} files, {} directories, {} bytes",
        src.display(),
        dest.display(),
        stats.files,
        stats.directories,
        stats.bytes
    );
    Ok(stats)
}

struct CopyVisitor<'a> {
    fs: &'a dyn FileSystem,
    src: &'a Path,
    dest: &'a Path,
    options: &'a CopyOptions,
    on_progress: Option<&'a ProgressCallback>,
    stats: CopyStats,
    /// Mirrored directories in creation (pre-)order, with source mtimes
    directories: Vec<(PathBuf, SystemTime)>,
}

impl CopyVisitor<'_> {
    fn mirror_path(&self, entry: &Entry) -> PathBuf {
        self.dest.join(entry.relative_to(self.src))
    }

    fn mirror_directory(&mut self, entry: &Entry, target: PathBuf) -> Result<()> {
        match self.fs.create_dir(&target) {
            Ok(()) => debug!("Created directory {}", target.display()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.fs.is_dir(&target) => {}
            Err(e) => return Err(TreeError::from_io(&target, e)),
        }
        self.stats.directories += 1;
        self.directories.push((target, entry.modified));
        Ok(())
    }
}

impl Visitor for CopyVisitor<'_> {
    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl> {
        let target = self.mirror_path(entry);

        if entry.is_dir() {
            self.mirror_directory(entry, target)?;
        } else if entry.is_symlink() {
            copy_symlink(self.fs, &entry.path, &target)?;
            self.stats.symlinks += 1;
        } else {
            match copy_file(self.fs, &entry.path, &target, self.options) {
                Ok(bytes) => {
                    self.stats.files += 1;
                    self.stats.bytes += bytes;
                    if let Some(callback) = self.on_progress {
                        callback(self.stats.files, self.stats.bytes);
                    }
                }
                Err(TreeError::NotARegularFile { path }) => {
                    warn!("Skipping special file {}", path.display());
                    self.stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(WalkControl::Continue)
    }
}

/// `dir.join(name of source)`, the destination of every `*_to_directory` call
pub(crate) fn destination_in(dir: &Path, source: &Path) -> Result<PathBuf> {
    match source.file_name() {
        Some(name) => Ok(dir.join(name)),
        None => Err(TreeError::Io {
            path: source.to_path_buf(),
            error: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        }),
    }
}

/// Copy a file into `dir`, keeping its name. Returns bytes copied.
pub fn copy_file_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    options: &CopyOptions,
) -> Result<u64> {
    if fs.exists(dir) && !fs.is_dir(dir) {
        return Err(TreeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let dest = destination_in(dir, src)?;
    copy_file(fs, src, &dest, options)
}

/// Copy a directory into `dir` as a new child of the same name.
///
/// `filter` works as in [`copy_directory`].
pub fn copy_directory_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    filter: Option<Arc<dyn PathFilter>>,
    options: &CopyOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<CopyStats> {
    if fs.exists(dir) && !fs.is_dir(dir) {
        return Err(TreeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let dest = destination_in(dir, src)?;
    copy_directory(fs, src, &dest, filter, options, on_progress)
}

/// Copy a file or a directory into `dir`, dispatching on the source kind
pub fn copy_to_directory(
    fs: &dyn FileSystem,
    src: &Path,
    dir: &Path,
    options: &CopyOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<CopyStats> {
    if fs.metadata(src).at(src)?.is_dir() {
        copy_directory_to_directory(fs, src, dir, None, options, on_progress)
    } else {
        let bytes = copy_file_to_directory(fs, src, dir, options)?;
        if let Some(callback) = on_progress {
            callback(1, bytes);
        }
        Ok(CopyStats {
            files: 1,
            bytes,
            ..CopyStats::default()
        })
    }
}

/// Copy every source into `dir`, files and directories alike.
///
/// All sources are checked for existence before anything is copied, so a
/// missing one fails the call with `NotFound` and leaves `dir` untouched.
pub fn copy_all_to_directory<'a, I>(
    fs: &dyn FileSystem,
    sources: I,
    dir: &Path,
    options: &CopyOptions,
) -> Result<CopyStats>
where
    I: IntoIterator<Item = &'a Path>,
{
    let sources: Vec<&Path> = sources.into_iter().collect();
    for src in &sources {
        fs.metadata(src).at(src)?;
    }
    if fs.exists(dir) && !fs.is_dir(dir) {
        return Err(TreeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut total = CopyStats::default();
    for src in sources {
        total += copy_to_directory(fs, src, dir, options, None)?;
    }
    debug!("Copied {} files into {}", total.files, dir.display());
    Ok(total)
}
