//! Read-only commands: list, size, checksum

use crate::aggregate::ChecksumScope;
use crate::config::ListArgs;
use crate::types::{Entry, EntryKind};
use crate::walker::TraversalOrder;
use crate::{Config, TreeOps};
use chrono::{DateTime, Local, Utc};
use indicatif::HumanBytes;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// One line of `list --json`
#[derive(Serialize)]
struct EntryRecord<'a> {
    path: &'a Path,
    kind: EntryKind,
    size: u64,
    modified: DateTime<Utc>,
    depth: usize,
}

impl<'a> From<&'a Entry> for EntryRecord<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            path: &entry.path,
            kind: entry.kind,
            size: entry.size,
            modified: DateTime::<Utc>::from(entry.modified),
            depth: entry.depth,
        }
    }
}

pub(super) fn list(args: &ListArgs, config: &Config, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let mut options = config.walk_options(&args.root)?;
    if args.post_order {
        options = options.order(TraversalOrder::PostOrder);
    }

    let ops = TreeOps::new();
    // Streamed: entries are printed as the walk reaches them.
    for entry in &ops.iterate(&args.root, &options) {
        let entry = entry?;
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&EntryRecord::from(&entry))?)?;
        } else if args.long {
            let modified: DateTime<Local> = entry.modified.into();
            writeln!(
                out,
                "{:<4} {:>12} {} {}",
                entry.kind.as_str(),
                entry.size,
                modified.format("%Y-%m-%d %H:%M:%S"),
                entry.path.display()
            )?;
        } else {
            writeln!(out, "{}", entry.path.display())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) fn size(path: &Path, exact: bool, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let total = TreeOps::new().size_of(path)?;
    if exact {
        writeln!(out, "{}", total)?;
    } else {
        writeln!(out, "{}", HumanBytes(total))?;
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) fn checksum(path: &Path, tree: bool, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let scope = if tree {
        ChecksumScope::Tree
    } else {
        ChecksumScope::File
    };
    let mut hasher = blake3::Hasher::new();
    let hash = TreeOps::new().checksum_of(path, &mut hasher, scope)?;
    writeln!(out, "{}  {}", hash.to_hex(), path.display())?;
    Ok(ExitCode::SUCCESS)
}
