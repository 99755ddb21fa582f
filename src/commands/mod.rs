//! CLI command implementations
//!
//! Each command writes its result to the given writer; the binary passes
//! stdout. Errors are returned, never printed here.

mod list;
mod transfer;

use crate::config::{Cli, Command};
use crate::Config;
use std::io::Write;
use std::process::ExitCode;

/// Run the parsed command with the resolved configuration
pub fn run(cli: &Cli, config: &Config, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::List(args) => list::list(args, config, out),
        Command::Size { path, bytes } => list::size(path, *bytes, out),
        Command::Checksum { path, tree } => list::checksum(path, *tree, out),
        Command::Copy(args) => transfer::copy(args, config, out),
        Command::Move(args) => transfer::move_entry(args, config, out),
        Command::Delete { path, quiet } => transfer::delete(path, *quiet, out),
        Command::Compare { first, second } => transfer::compare(first, second, out),
    }
}
