//! Command-line definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "treeops")]
#[command(about = "Walk, measure, copy and move directory trees safely")]
#[command(version)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the entries under a directory in depth-first order
    List(ListArgs),

    /// Total size of a file or directory tree
    Size {
        path: PathBuf,

        /// Print an exact byte count
        #[arg(long)]
        bytes: bool,
    },

    /// BLAKE3 checksum of a file
    Checksum {
        path: PathBuf,

        /// Accept a directory: hash all its files in traversal order
        #[arg(long)]
        tree: bool,
    },

    /// Copy a file or directory
    Copy(CopyArgs),

    /// Move a file or directory
    Move(MoveArgs),

    /// Delete a file or directory tree
    Delete {
        path: PathBuf,

        /// Never fail; report what is left instead
        #[arg(short, long)]
        quiet: bool,
    },

    /// Compare two files byte for byte
    Compare { first: PathBuf, second: PathBuf },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Skip entries matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Only list entries matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Gitignore-format rule file (repeatable)
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub root: PathBuf,

    /// Include directories in the output
    #[arg(long)]
    pub dirs: bool,

    /// List children before their directory
    #[arg(long)]
    pub post_order: bool,

    /// Skip unreadable directories instead of failing
    #[arg(long)]
    pub skip_errors: bool,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print one JSON object per entry
    #[arg(long, conflicts_with = "long")]
    pub json: bool,

    /// Show kind, size and modification time
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    pub source: PathBuf,
    pub destination: PathBuf,

    /// Treat DESTINATION as a directory to copy into
    #[arg(long)]
    pub into: bool,

    /// Do not preserve modification times
    #[arg(long)]
    pub no_preserve: bool,

    /// Skip entries matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Hide the progress display
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    pub source: PathBuf,
    pub destination: PathBuf,

    /// Treat DESTINATION as a directory to move into
    #[arg(long)]
    pub into: bool,

    /// Create DESTINATION when moving into a missing directory
    #[arg(long)]
    pub create_parents: bool,
}
