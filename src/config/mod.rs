//! Configuration management

mod cli;

pub use cli::{Cli, Command, CopyArgs, FilterArgs, ListArgs, MoveArgs};

use crate::copy::{CopyOptions, DEFAULT_BUFFER_SIZE};
use crate::filter::{FilterPair, GlobFilter, IgnoreFilter, PathFilter, PathFilterExt};
use crate::types::{Entry, IoResultExt, TreeError};
use crate::walker::{ErrorPolicy, WalkOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Settings shared by every command.
///
/// Loaded from a TOML file; command-line flags override individual values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Stamp copies with the source modification times
    pub preserve_timestamps: bool,

    /// Create a missing target directory for `move --into`
    pub create_parents: bool,

    /// Report directories in listings, not only files
    pub include_dirs: bool,

    /// Skip unreadable directories instead of aborting the walk
    pub skip_unreadable: bool,

    /// Exclude patterns (globs); excluded directories are not entered
    pub exclude: Vec<String>,

    /// Include patterns (globs); when set, only matching entries are listed
    pub include: Vec<String>,

    /// Gitignore-format rule files
    pub ignore_files: Vec<PathBuf>,

    /// Copy buffer size in bytes
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            create_parents: false,
            include_dirs: false,
            skip_unreadable: false,
            exclude: Vec::new(),
            include: Vec::new(),
            ignore_files: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let contents = std::fs::read_to_string(path).at(path)?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            TreeError::Config(msg) => TreeError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, TreeError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| TreeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.buffer_size == 0 {
            return Err(TreeError::Config(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        GlobFilter::new(&self.exclude)?;
        GlobFilter::new(&self.include)?;
        Ok(())
    }

    /// Filters and error policy for walking `root`.
    ///
    /// Excludes and ignore rules prune both descent and output; include
    /// patterns only narrow the output.
    pub fn walk_options(&self, root: &Path) -> Result<WalkOptions, TreeError> {
        let descent = self.exclusion_filter(root)?;
        let inclusion: Arc<dyn PathFilter> = if self.include.is_empty() {
            Arc::clone(&descent)
        } else {
            let included = GlobFilter::new(&self.include)?.relative_to(root);
            let excluded = Arc::clone(&descent);
            Arc::new(move |entry: &Entry| excluded.accept(entry) && included.accept(entry))
        };

        let on_error = if self.skip_unreadable {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        };

        Ok(WalkOptions::new()
            .filters(FilterPair { descent, inclusion })
            .include_dirs(self.include_dirs)
            .on_error(on_error))
    }

    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions::default()
            .preserve_timestamps(self.preserve_timestamps)
            .buffer_size(self.buffer_size)
    }

    /// Filter for copying the tree under `root`; `None` copies everything
    pub fn copy_filter(&self, root: &Path) -> Result<Option<Arc<dyn PathFilter>>, TreeError> {
        if self.exclude.is_empty() && self.ignore_files.is_empty() {
            return Ok(None);
        }
        self.exclusion_filter(root).map(Some)
    }

    fn exclusion_filter(&self, root: &Path) -> Result<Arc<dyn PathFilter>, TreeError> {
        let excluded = GlobFilter::new(&self.exclude)?.relative_to(root);
        if self.ignore_files.is_empty() {
            return Ok(Arc::new(excluded.not()));
        }
        let ignored = IgnoreFilter::from_files(root, &self.ignore_files)?;
        Ok(Arc::new(excluded.not().and(ignored)))
    }
}

impl TryFrom<&Cli> for Config {
    type Error = TreeError;

    /// Config file (if any) first, then the command's flags on top
    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let mut config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        match &cli.command {
            Command::List(args) => {
                config.include_dirs |= args.dirs;
                config.skip_unreadable |= args.skip_errors;
                config.apply_filters(&args.filters);
            }
            Command::Copy(args) => {
                if args.no_preserve {
                    config.preserve_timestamps = false;
                }
                config.exclude.extend(args.exclude.iter().cloned());
            }
            Command::Move(args) => {
                config.create_parents |= args.create_parents;
            }
            Command::Size { .. }
            | Command::Checksum { .. }
            | Command::Delete { .. }
            | Command::Compare { .. } => {}
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    fn apply_filters(&mut self, filters: &FilterArgs) {
        self.exclude.extend(filters.exclude.iter().cloned());
        self.include.extend(filters.include.iter().cloned());
        self.ignore_files.extend(filters.ignore_file.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use clap::Parser;
    use std::time::UNIX_EPOCH;

    fn entry(path: &str, kind: EntryKind) -> Entry {
        Entry::new(PathBuf::from(path), kind, 0, UNIX_EPOCH)
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::from_toml_str("").expect("empty config");
        assert_eq!(config, Config::default());
        assert!(config.preserve_timestamps);
        assert_eq!(config.buffer_size, 128 * 1024);
    }

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml_str(
            r#"
preserve_timestamps = false
skip_unreadable = true
exclude = ["*.tmp", "target/**"]
buffer_size = 4096
"#,
        )
        .expect("parse");

        assert!(!config.preserve_timestamps);
        assert!(config.skip_unreadable);
        assert_eq!(config.exclude.len(), 2);
        assert_eq!(config.copy_options().buffer_size, 4096);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let error = Config::from_toml_str("follow_links = true").unwrap_err();
        assert!(matches!(error, TreeError::Config(_)));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let error = Config::from_toml_str("buffer_size = 0").unwrap_err();
        assert!(error.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let error = Config::from_toml_str(r#"exclude = ["[oops"]"#).unwrap_err();
        assert!(matches!(error, TreeError::Config(_)));
    }

    #[test]
    fn test_walk_options_exclude_prunes_descent() {
        let config = Config {
            exclude: vec!["node_modules".to_string()],
            include: vec!["*.rs".to_string()],
            ..Config::default()
        };
        let options = config.walk_options(Path::new("/p")).expect("options");

        let deps = entry("/p/node_modules", EntryKind::Directory);
        let src = entry("/p/src", EntryKind::Directory);
        assert!(!options.filters.should_descend(&deps));
        assert!(options.filters.should_descend(&src));
        assert!(options.filters.should_include(&entry("/p/src/main.rs", EntryKind::File)));
        assert!(!options.filters.should_include(&entry("/p/README.md", EntryKind::File)));
    }

    #[test]
    fn test_copy_filter_absent_without_excludes() {
        let config = Config::default();
        assert!(config.copy_filter(Path::new("/p")).expect("filter").is_none());
    }

    #[test]
    fn test_cli_flags_override_file_defaults() {
        let cli = Cli::parse_from([
            "treeops",
            "list",
            "/tmp",
            "--dirs",
            "--skip-errors",
            "--exclude",
            "*.log",
        ]);

        let config = Config::try_from(&cli).expect("config");

        assert!(config.include_dirs);
        assert!(config.skip_unreadable);
        assert_eq!(config.exclude, vec!["*.log".to_string()]);
    }

    #[test]
    fn test_cli_no_preserve() {
        let cli = Cli::parse_from(["treeops", "copy", "a", "b", "--no-preserve"]);
        let config = Config::try_from(&cli).expect("config");
        assert!(!config.copy_options().preserve_timestamps);
    }
}
