//! Mutating commands: copy, move, delete, plus compare

use crate::config::{CopyArgs, MoveArgs};
use crate::copy::{CopyStats, ProgressCallback};
use crate::fs::FileSystem;
use crate::ui::ProgressReporter;
use crate::{Config, TreeOps};
use console::style;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

pub(super) fn copy(args: &CopyArgs, config: &Config, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let ops = TreeOps::new().copy_options(config.copy_options());
    let source = args.source.as_path();

    if !ops.fs().is_dir(source) {
        let bytes = if args.into {
            ops.copy_file_to_directory(source, &args.destination)?
        } else {
            ops.copy_file(source, &args.destination)?
        };
        writeln!(out, "Copied 1 file ({} bytes)", bytes)?;
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = Arc::new(Mutex::new(if args.quiet {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    }));
    if let Ok(mut progress) = reporter.lock() {
        progress.start(&source.display().to_string());
    }
    let callback: ProgressCallback = {
        let reporter = Arc::clone(&reporter);
        Box::new(move |files: u64, bytes: u64| {
            if let Ok(mut progress) = reporter.lock() {
                progress.update(files, bytes);
            }
        })
    };

    let filter = config.copy_filter(source)?;
    let result = if args.into {
        ops.copy_directory_to_directory(source, &args.destination, filter, Some(&callback))
    } else {
        ops.copy_directory(source, &args.destination, filter, Some(&callback))
    };
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Ok(progress) = reporter.lock() {
                progress.abandon();
            }
            return Err(e.into());
        }
    };
    if let Ok(mut progress) = reporter.lock() {
        progress.finish(&stats);
    }

    print_copy_summary(&stats, out)?;
    Ok(ExitCode::SUCCESS)
}

fn print_copy_summary(stats: &CopyStats, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "Copied {} files, {} directories, {} links ({} bytes)",
        stats.files, stats.directories, stats.symlinks, stats.bytes
    )
}

pub(super) fn move_entry(
    args: &MoveArgs,
    config: &Config,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    let ops = TreeOps::new();
    let source = args.source.as_path();

    if args.into {
        ops.move_to_directory(source, &args.destination, config.create_parents)?;
    } else if is_real_directory(&ops, source) {
        ops.move_directory(source, &args.destination)?;
    } else {
        ops.move_file(source, &args.destination)?;
    }

    writeln!(
        out,
        "Moved {} -> {}",
        source.display(),
        args.destination.display()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// A symlink to a directory moves as a link
fn is_real_directory(ops: &TreeOps, path: &Path) -> bool {
    ops.fs()
        .symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

pub(super) fn delete(path: &Path, quiet: bool, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let ops = TreeOps::new();

    if quiet {
        if !ops.delete_quietly(path) {
            writeln!(out, "{} {}", style("left behind:").yellow(), path.display())?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    ops.force_delete(path)?;
    writeln!(out, "Deleted {}", path.display())?;
    Ok(ExitCode::SUCCESS)
}

/// Exit status 1 when the files differ, like `cmp`
pub(super) fn compare(first: &Path, second: &Path, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    if TreeOps::new().content_equals(first, second)? {
        writeln!(out, "identical")?;
        Ok(ExitCode::SUCCESS)
    } else {
        writeln!(out, "{}", style("different").red())?;
        Ok(ExitCode::from(1))
    }
}
