//! Lazy traversal

use super::{Step, Traversal, WalkOptions};
use crate::fs::FileSystem;
use crate::types::{Entry, Result};
use std::path::{Path, PathBuf};

/// Restartable sequence of the entries under a root.
///
/// Holds no cursor of its own: every call to [`TreeIter::iter`] starts an
/// independent traversal.
#[derive(Clone)]
pub struct TreeIter<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    options: WalkOptions,
}

impl<'a> TreeIter<'a> {
    pub(crate) fn new(fs: &'a dyn FileSystem, root: &Path, options: WalkOptions) -> Self {
        Self {
            fs,
            root: root.to_path_buf(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh traversal
    pub fn iter(&self) -> Entries<'a> {
        Entries {
            traversal: Traversal::new(self.fs, &self.root, self.options.clone()),
        }
    }
}

impl<'a> IntoIterator for &TreeIter<'a> {
    type Item = Result<Entry>;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One in-progress lazy traversal.
///
/// Suspends between yielded entries. After an error (abort policy) the
/// iterator is exhausted.
pub struct Entries<'a> {
    traversal: Traversal<'a>,
}

impl Iterator for Entries<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.traversal.next_step()? {
                Ok(Step::Visit(entry)) => return Some(Ok(entry)),
                // Already logged by the step machine under the skip policy.
                Ok(Step::Skipped(..)) => continue,
                Ok(Step::EnterDir(_)) | Ok(Step::LeaveDir(_)) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl std::iter::FusedIterator for Entries<'_> {}
