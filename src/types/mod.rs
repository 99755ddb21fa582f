//! Core type definitions for treeops

mod entry;
mod error;

pub use entry::{Entry, EntryKind};
pub(crate) use error::IoResultExt;
pub use error::{Containment, ErrorKind, Result, TreeError};
