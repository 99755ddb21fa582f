//! # treeops - Filesystem Tree Operations
//!
//! Walk, measure, copy and move directory trees without surprises.
//!
//! Every operation runs on one depth-first walker with separate descent and
//! inclusion filters. Copies verify their output length, moves fall back
//! from rename to copy-and-delete with rollback, and a destination inside
//! its own source is rejected before anything is written.

// Module declarations
pub mod aggregate;
pub mod commands;
pub mod compare;
pub mod config;
pub mod containment;
pub mod copy;
pub mod delete;
pub mod filter;
pub mod fs;
pub mod mover;
pub mod ops;
pub mod types;
pub mod ui;
pub mod walker;

// Re-export commonly used types
pub use config::Config;
pub use ops::TreeOps;
pub use types::{Entry, EntryKind, ErrorKind, Result, TreeError};
pub use walker::{walk, iterate, TraversalOrder, Visitor, WalkControl, WalkOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
