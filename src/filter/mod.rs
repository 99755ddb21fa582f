//! Path filters
//!
//! A [`PathFilter`] is a stateless predicate over an [`Entry`]. The walker
//! composes two of them in a [`FilterPair`]: the *descent* filter decides
//! whether a directory's children are enumerated at all, the *inclusion*
//! filter decides whether an entry shows up in the output.

mod glob;

pub use glob::{GlobFilter, IgnoreFilter};

use crate::types::{Entry, EntryKind};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

/// Accept/reject predicate over a traversal entry.
///
/// `Send + Sync` are required so one filter can be shared by independent
/// walks running on different threads.
pub trait PathFilter: Send + Sync {
    /// Returns `true` if the entry is accepted.
    fn accept(&self, entry: &Entry) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&Entry) -> bool + Send + Sync,
{
    fn accept(&self, entry: &Entry) -> bool {
        self(entry)
    }
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathFilter for AcceptAll {
    fn accept(&self, _entry: &Entry) -> bool {
        true
    }
}

/// Accepts entries whose file name is one of a fixed set
#[derive(Debug, Clone)]
pub struct NameFilter {
    names: HashSet<OsString>,
    ignore_case: bool,
}

impl NameFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    /// Compare names case-insensitively (ASCII/Unicode lowercase of the
    /// lossy UTF-8 form)
    pub fn ignore_case(mut self) -> Self {
        self.names = self
            .names
            .iter()
            .map(|n| OsString::from(n.to_string_lossy().to_lowercase()))
            .collect();
        self.ignore_case = true;
        self
    }
}

impl PathFilter for NameFilter {
    fn accept(&self, entry: &Entry) -> bool {
        if self.ignore_case {
            let lowered = OsString::from(entry.name().to_string_lossy().to_lowercase());
            self.names.contains(&lowered)
        } else {
            self.names.contains(entry.name())
        }
    }
}

/// Accepts entries of the listed kinds
#[derive(Debug, Clone, Copy)]
pub struct KindFilter {
    files: bool,
    dirs: bool,
    links: bool,
}

impl KindFilter {
    pub fn files() -> Self {
        Self {
            files: true,
            dirs: false,
            links: false,
        }
    }

    pub fn directories() -> Self {
        Self {
            files: false,
            dirs: true,
            links: false,
        }
    }

    pub fn with(mut self, kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => self.files = true,
            EntryKind::Directory => self.dirs = true,
            EntryKind::Symlink => self.links = true,
        }
        self
    }
}

impl PathFilter for KindFilter {
    fn accept(&self, entry: &Entry) -> bool {
        match entry.kind {
            EntryKind::File => self.files,
            EntryKind::Directory => self.dirs,
            EntryKind::Symlink => self.links,
        }
    }
}

/// Negation of a filter
pub struct Not<A>(pub A);

impl<A: PathFilter> PathFilter for Not<A> {
    fn accept(&self, entry: &Entry) -> bool {
        !self.0.accept(entry)
    }
}

/// Both filters must accept
pub struct And<A, B>(pub A, pub B);

impl<A: PathFilter, B: PathFilter> PathFilter for And<A, B> {
    fn accept(&self, entry: &Entry) -> bool {
        self.0.accept(entry) && self.1.accept(entry)
    }
}

/// Either filter may accept
pub struct Or<A, B>(pub A, pub B);

impl<A: PathFilter, B: PathFilter> PathFilter for Or<A, B> {
    fn accept(&self, entry: &Entry) -> bool {
        self.0.accept(entry) || self.1.accept(entry)
    }
}

/// Combinators available on every sized filter
pub trait PathFilterExt: PathFilter + Sized {
    fn and<B: PathFilter>(self, other: B) -> And<Self, B> {
        And(self, other)
    }

    fn or<B: PathFilter>(self, other: B) -> Or<Self, B> {
        Or(self, other)
    }

    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: PathFilter + Sized> PathFilterExt for T {}

/// Descent and inclusion filters used by one walk
#[derive(Clone)]
pub struct FilterPair {
    pub descent: Arc<dyn PathFilter>,
    pub inclusion: Arc<dyn PathFilter>,
}

impl FilterPair {
    pub fn new(
        descent: impl PathFilter + 'static,
        inclusion: impl PathFilter + 'static,
    ) -> Self {
        Self {
            descent: Arc::new(descent),
            inclusion: Arc::new(inclusion),
        }
    }

    /// Use one filter for both roles, as directory copy does
    pub fn uniform(filter: Arc<dyn PathFilter>) -> Self {
        Self {
            descent: Arc::clone(&filter),
            inclusion: filter,
        }
    }

    pub fn with_descent(mut self, descent: impl PathFilter + 'static) -> Self {
        self.descent = Arc::new(descent);
        self
    }

    pub fn with_inclusion(mut self, inclusion: impl PathFilter + 'static) -> Self {
        self.inclusion = Arc::new(inclusion);
        self
    }

    pub fn should_descend(&self, dir: &Entry) -> bool {
        self.descent.accept(dir)
    }

    pub fn should_include(&self, entry: &Entry) -> bool {
        self.inclusion.accept(entry)
    }
}

impl Default for FilterPair {
    fn default() -> Self {
        Self::new(AcceptAll, AcceptAll)
    }
}

impl fmt::Debug for FilterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPair").finish_non_exhaustive()
    }
}
