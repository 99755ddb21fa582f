//! Depth-first tree walker
//!
//! [`walk`] drives a [`Visitor`] through directory-start, entry and
//! directory-end events. [`iterate`] exposes the same traversal as a lazy,
//! restartable sequence. Both run on one step machine, so the entries they
//! produce never diverge.
//!
//! Symlinks are terminal: a link to a directory is reported (or filtered)
//! like any other entry but is never entered. This guarantees termination on
//! cyclic link graphs without tracking visited inodes, at the cost of not
//! traversing legitimately symlinked subtrees.

mod step;
mod iter;

pub use iter::{Entries, TreeIter};

pub(crate) use step::{Step, Traversal};

use crate::filter::{FilterPair, PathFilter};
use crate::fs::FileSystem;
use crate::types::{Entry, Result, TreeError};
use std::path::Path;

/// Where directories appear relative to their children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Directory before its children
    #[default]
    PreOrder,
    /// Directory after its children (safe order for teardown)
    PostOrder,
}

/// What to do when a directory cannot be enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the walk and surface the error
    #[default]
    Abort,
    /// Report the error to the visitor, skip the entry and continue.
    /// The root itself is never skipped.
    Skip,
}

/// Visitor's answer after each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// Traversal parameters
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub filters: FilterPair,
    /// Report directories that pass the inclusion filter, not only files
    pub include_dirs: bool,
    pub order: TraversalOrder,
    pub on_error: ErrorPolicy,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(mut self, filters: FilterPair) -> Self {
        self.filters = filters;
        self
    }

    pub fn descent(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filters = self.filters.with_descent(filter);
        self
    }

    pub fn inclusion(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filters = self.filters.with_inclusion(filter);
        self
    }

    pub fn include_dirs(mut self, include_dirs: bool) -> Self {
        self.include_dirs = include_dirs;
        self
    }

    pub fn order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }
}

/// Callbacks fired by [`walk`].
///
/// Returning `Err` from any callback aborts the walk and propagates the
/// error; returning `WalkControl::Stop` ends it early without error.
pub trait Visitor {
    /// Fired before the children of `dir` are processed (depth 0 is the root)
    fn enter_directory(&mut self, _dir: &Entry) -> Result<WalkControl> {
        Ok(WalkControl::Continue)
    }

    fn visit_entry(&mut self, entry: &Entry) -> Result<WalkControl>;

    /// Fired after all children of `dir` have been processed
    fn leave_directory(&mut self, _dir: &Entry) -> Result<WalkControl> {
        Ok(WalkControl::Continue)
    }

    /// A subtree was skipped under [`ErrorPolicy::Skip`]
    fn on_error(&mut self, _path: &Path, _error: &TreeError) {}
}

/// Summary of a completed or stopped walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkOutcome {
    /// Number of `visit_entry` calls
    pub visited: usize,
    /// Whether the visitor asked to stop early
    pub stopped: bool,
}

/// Walk `root` depth-first, driving `visitor` to completion or early stop.
pub fn walk(
    fs: &dyn FileSystem,
    root: &Path,
    options: &WalkOptions,
    visitor: &mut dyn Visitor,
) -> Result<WalkOutcome> {
    let mut traversal = Traversal::new(fs, root, options.clone());
    let mut outcome = WalkOutcome::default();

    while let Some(step) = traversal.next_step() {
        let control = match step? {
            Step::EnterDir(dir) => visitor.enter_directory(&dir)?,
            Step::Visit(entry) => {
                outcome.visited += 1;
                visitor.visit_entry(&entry)?
            }
            Step::LeaveDir(dir) => visitor.leave_directory(&dir)?,
            Step::Skipped(path, error) => {
                visitor.on_error(&path, &error);
                WalkControl::Continue
            }
        };

        if control == WalkControl::Stop {
            outcome.stopped = true;
            break;
        }
    }

    Ok(outcome)
}

/// Lazy, restartable view of the traversal of `root`
pub fn iterate<'a>(fs: &'a dyn FileSystem, root: &Path, options: &WalkOptions) -> TreeIter<'a> {
    TreeIter::new(fs, root, options.clone())
}
