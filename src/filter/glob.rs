//! Pattern-based filters: shell globs and gitignore-format rule files

use super::PathFilter;
use crate::types::{Entry, Result, TreeError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Accepts entries matching any of a set of glob patterns.
///
/// A pattern without a `/` is matched against the file name (`*.log`);
/// a pattern with one is matched against the path relative to the base
/// directory (`build/**/*.o`).
#[derive(Debug, Clone)]
pub struct GlobFilter {
    by_name: GlobSet,
    by_path: GlobSet,
    base: Option<PathBuf>,
    empty: bool,
}

impl GlobFilter {
    /// Compile patterns. Invalid globs are reported as `TreeError::Config`.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_name = GlobSetBuilder::new();
        let mut by_path = GlobSetBuilder::new();
        let mut empty = true;

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| {
                TreeError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            if pattern.contains('/') {
                by_path.add(glob);
            } else {
                by_name.add(glob);
            }
            empty = false;
        }

        let build_error =
            |e: globset::Error| TreeError::Config(format!("Failed to build glob set: {}", e));
        Ok(Self {
            by_name: by_name.build().map_err(build_error)?,
            by_path: by_path.build().map_err(build_error)?,
            base: None,
            empty,
        })
    }

    /// Match path patterns relative to `base` instead of the full path
    pub fn relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// True when no pattern was given (such a filter rejects everything)
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_match(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name() {
            if self.by_name.is_match(name) {
                return true;
            }
        }
        let relative = match &self.base {
            Some(base) => path.strip_prefix(base).unwrap_or(path),
            None => path,
        };
        self.by_path.is_match(relative)
    }
}

impl PathFilter for GlobFilter {
    fn accept(&self, entry: &Entry) -> bool {
        self.is_match(&entry.path)
    }
}

/// Rejects entries ignored by gitignore-format rules.
///
/// Used as a descent filter it also stops the walker from entering ignored
/// directories, so their contents are never enumerated.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    rules: Gitignore,
}

impl IgnoreFilter {
    /// Load rules from one or more ignore files, anchored at `root`
    pub fn from_files<P: AsRef<Path>>(root: &Path, files: &[P]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for file in files {
            let file = file.as_ref();
            if !file.exists() {
                return Err(TreeError::NotFound {
                    path: file.to_path_buf(),
                });
            }
            if let Some(e) = builder.add(file) {
                return Err(TreeError::Config(format!(
                    "Invalid ignore file '{}': {}",
                    file.display(),
                    e
                )));
            }
        }
        Self::build(builder)
    }

    /// Build rules from in-memory lines (`*.tmp`, `cache/`, `!keep.tmp`)
    pub fn from_lines<I, S>(root: &Path, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        for line in lines {
            let line = line.as_ref();
            builder.add_line(None, line).map_err(|e| {
                TreeError::Config(format!("Invalid ignore rule '{}': {}", line, e))
            })?;
        }
        Self::build(builder)
    }

    fn build(builder: GitignoreBuilder) -> Result<Self> {
        let rules = builder
            .build()
            .map_err(|e| TreeError::Config(format!("Failed to build ignore rules: {}", e)))?;
        Ok(Self { rules })
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.rules.matched(path, is_dir).is_ignore()
    }
}

impl PathFilter for IgnoreFilter {
    fn accept(&self, entry: &Entry) -> bool {
        !self.is_ignored(&entry.path, entry.is_dir())
    }
}
