//! `TreeOps`: every operation bound to one filesystem

use crate::aggregate::{self, Checksum, ChecksumScope};
use crate::compare;
use crate::containment;
use crate::copy::{self, CopyOptions, CopyStats, ProgressCallback};
use crate::delete;
use crate::filter::PathFilter;
use crate::fs::{FileSystem, StdFs};
use crate::mover;
use crate::types::{Entry, Result};
use crate::walker::{self, TreeIter, Visitor, WalkOptions, WalkOutcome};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Entry point for callers that do not want to thread a filesystem through
/// every call.
///
/// ```no_run
/// use treeops::TreeOps;
/// use std::path::Path;
///
/// let ops = TreeOps::new();
/// let bytes = ops.size_of(Path::new("/var/log"))?;
/// ops.copy_directory(Path::new("/var/log"), Path::new("/tmp/log"), None, None)?;
/// # Ok::<(), treeops::TreeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeOps<F: FileSystem = StdFs> {
    fs: F,
    copy_options: CopyOptions,
}

impl TreeOps<StdFs> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem> TreeOps<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            copy_options: CopyOptions::default(),
        }
    }

    /// Options for the copy methods; move fallbacks always use the defaults
    pub fn copy_options(mut self, options: CopyOptions) -> Self {
        self.copy_options = options;
        self
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn walk(
        &self,
        root: &Path,
        options: &WalkOptions,
        visitor: &mut dyn Visitor,
    ) -> Result<WalkOutcome> {
        walker::walk(&self.fs, root, options, visitor)
    }

    pub fn list(&self, root: &Path, options: &WalkOptions) -> Result<Vec<Entry>> {
        aggregate::list(&self.fs, root, options)
    }

    pub fn iterate(&self, root: &Path, options: &WalkOptions) -> TreeIter<'_> {
        walker::iterate(&self.fs, root, options)
    }

    pub fn size_of(&self, path: &Path) -> Result<u64> {
        aggregate::size_of(&self.fs, path)
    }

    pub fn size_of_directory(&self, dir: &Path) -> Result<u64> {
        aggregate::size_of_directory(&self.fs, dir)
    }

    pub fn checksum_of<C: Checksum>(
        &self,
        path: &Path,
        checksum: &mut C,
        scope: ChecksumScope,
    ) -> Result<C::Output> {
        aggregate::checksum_of(&self.fs, path, checksum, scope)
    }

    pub fn check_containment(&self, source: &Path, destination: &Path) -> Result<()> {
        containment::check(&self.fs, source, destination)
    }

    pub fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        copy::copy_file(&self.fs, src, dest, &self.copy_options)
    }

    pub fn copy_directory(
        &self,
        src: &Path,
        dest: &Path,
        filter: Option<Arc<dyn PathFilter>>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CopyStats> {
        copy::copy_directory(&self.fs, src, dest, filter, &self.copy_options, on_progress)
    }

    pub fn copy_file_to_directory(&self, src: &Path, dir: &Path) -> Result<u64> {
        copy::copy_file_to_directory(&self.fs, src, dir, &self.copy_options)
    }

    pub fn copy_directory_to_directory(
        &self,
        src: &Path,
        dir: &Path,
        filter: Option<Arc<dyn PathFilter>>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CopyStats> {
        copy::copy_directory_to_directory(
            &self.fs,
            src,
            dir,
            filter,
            &self.copy_options,
            on_progress,
        )
    }

    pub fn copy_to_directory(
        &self,
        src: &Path,
        dir: &Path,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CopyStats> {
        copy::copy_to_directory(&self.fs, src, dir, &self.copy_options, on_progress)
    }

    pub fn copy_all_to_directory<'a, I>(&self, sources: I, dir: &Path) -> Result<CopyStats>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        copy::copy_all_to_directory(&self.fs, sources, dir, &self.copy_options)
    }

    pub fn move_file(&self, src: &Path, dest: &Path) -> Result<()> {
        mover::move_file(&self.fs, src, dest)
    }

    pub fn move_directory(&self, src: &Path, dest: &Path) -> Result<()> {
        mover::move_directory(&self.fs, src, dest)
    }

    pub fn move_file_to_directory(&self, src: &Path, dir: &Path, create: bool) -> Result<()> {
        mover::move_file_to_directory(&self.fs, src, dir, create)
    }

    pub fn move_directory_to_directory(
        &self,
        src: &Path,
        dir: &Path,
        create: bool,
    ) -> Result<()> {
        mover::move_directory_to_directory(&self.fs, src, dir, create)
    }

    pub fn move_to_directory(&self, src: &Path, dir: &Path, create: bool) -> Result<()> {
        mover::move_to_directory(&self.fs, src, dir, create)
    }

    pub fn delete_directory(&self, dir: &Path) -> Result<()> {
        delete::delete_directory(&self.fs, dir)
    }

    pub fn clean_directory(&self, dir: &Path) -> Result<()> {
        delete::clean_directory(&self.fs, dir)
    }

    pub fn force_delete(&self, path: &Path) -> Result<()> {
        delete::force_delete(&self.fs, path)
    }

    pub fn delete_quietly(&self, path: &Path) -> bool {
        delete::delete_quietly(&self.fs, path)
    }

    pub fn force_mkdir(&self, dir: &Path) -> Result<()> {
        delete::force_mkdir(&self.fs, dir)
    }

    pub fn content_equals(&self, a: &Path, b: &Path) -> Result<bool> {
        compare::content_equals(&self.fs, a, b)
    }

    pub fn content_equals_ignore_eol(&self, a: &Path, b: &Path) -> Result<bool> {
        compare::content_equals_ignore_eol(&self.fs, a, b)
    }

    pub fn is_newer_than(&self, path: &Path, reference: SystemTime) -> Result<bool> {
        compare::is_newer_than(&self.fs, path, reference)
    }

    pub fn is_older_than(&self, path: &Path, reference: SystemTime) -> Result<bool> {
        compare::is_older_than(&self.fs, path, reference)
    }

    pub fn is_newer_than_file(&self, path: &Path, reference: &Path) -> Result<bool> {
        compare::is_newer_than_file(&self.fs, path, reference)
    }

    pub fn is_older_than_file(&self, path: &Path, reference: &Path) -> Result<bool> {
        compare::is_older_than_file(&self.fs, path, reference)
    }
}
