//! Error types for treeops

use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a destination was rejected by the containment check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Destination is the source itself
    Identical,
    /// Destination lies inside the source directory
    Nested,
}

impl std::fmt::Display for Containment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Containment::Identical => write!(f, "cannot copy/move a path onto itself"),
            Containment::Nested => {
                write!(f, "cannot copy/move a directory into its own subtree")
            }
        }
    }
}

/// Error types for treeops operations
#[derive(Debug, Error)]
pub enum TreeError {
    /// Source (or a required directory) does not exist
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// Operation expected a directory
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Operation expected a non-directory
    #[error("Is a directory: {path}")]
    IsADirectory { path: PathBuf },

    /// FIFO, socket or device where file content was expected
    #[error("Not a regular file: {path}")]
    NotARegularFile { path: PathBuf },

    /// Destination conflict
    #[error("Destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Destination equal to or nested within source
    #[error("{reason}: {from} -> {to}")]
    SelfReference {
        from: PathBuf,
        to: PathBuf,
        reason: Containment,
    },

    /// Post-copy length check failed; the destination is left in place
    #[error("Incomplete transfer: {from} -> {to} (expected {expected} bytes, found {actual})")]
    IncompleteTransfer {
        from: PathBuf,
        to: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure
    #[error("IO error at {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: IoError,
    },

    /// Invalid configuration or filter pattern
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source could not be removed after the fallback copy; the copy was
    /// deleted again and the source is untouched
    #[error("Move rolled back: {from} -> {to}: {cause}")]
    MoveRolledBack {
        from: PathBuf,
        to: PathBuf,
        #[source]
        cause: Box<TreeError>,
    },

    /// Source directory was only partly removed after a complete copy; the
    /// destination is kept so that no data is lost
    #[error("Move incomplete: {to} is complete but {from} was only partly removed: {cause}")]
    MoveIncomplete {
        from: PathBuf,
        to: PathBuf,
        #[source]
        cause: Box<TreeError>,
    },
}

/// Flat classification of [`TreeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    IsADirectory,
    NotARegularFile,
    AlreadyExists,
    SelfReference,
    IncompleteTransfer,
    PermissionOrIo,
    Config,
    MoveFailed,
}

impl TreeError {
    /// Map an I/O error raised while working on `path` onto the taxonomy.
    pub fn from_io(path: &Path, error: IoError) -> Self {
        let path = path.to_path_buf();
        match error.kind() {
            IoErrorKind::NotFound => TreeError::NotFound { path },
            IoErrorKind::PermissionDenied => TreeError::PermissionDenied { path },
            IoErrorKind::AlreadyExists => TreeError::AlreadyExists { path },
            _ => TreeError::Io { path, error },
        }
    }

    /// Classification used by callers that only care about the category
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::NotFound { .. } => ErrorKind::NotFound,
            TreeError::NotADirectory { .. } => ErrorKind::NotADirectory,
            TreeError::IsADirectory { .. } => ErrorKind::IsADirectory,
            TreeError::NotARegularFile { .. } => ErrorKind::NotARegularFile,
            TreeError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            TreeError::SelfReference { .. } => ErrorKind::SelfReference,
            TreeError::IncompleteTransfer { .. } => ErrorKind::IncompleteTransfer,
            TreeError::PermissionDenied { .. } | TreeError::Io { .. } => ErrorKind::PermissionOrIo,
            TreeError::Config(_) => ErrorKind::Config,
            TreeError::MoveRolledBack { .. } | TreeError::MoveIncomplete { .. } => {
                ErrorKind::MoveFailed
            }
        }
    }

    /// The path this error occurred at, if there is a single one
    pub fn path(&self) -> Option<&Path> {
        match self {
            TreeError::NotFound { path }
            | TreeError::NotADirectory { path }
            | TreeError::IsADirectory { path }
            | TreeError::NotARegularFile { path }
            | TreeError::AlreadyExists { path }
            | TreeError::PermissionDenied { path }
            | TreeError::Io { path, .. } => Some(path),
            TreeError::IncompleteTransfer { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Whether a walk may skip the offending entry and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TreeError::NotFound { .. } | TreeError::PermissionDenied { .. } | TreeError::Io { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NotFound { .. })
    }

    pub fn is_self_reference(&self) -> bool {
        matches!(self, TreeError::SelfReference { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TreeError>;

/// Attach a path to raw I/O results.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| TreeError::from_io(path, e))
    }
}
