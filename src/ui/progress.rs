//! Progress reporting

use crate::copy::CopyStats;
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner showing files and bytes copied so far
pub struct ProgressReporter {
    bar: ProgressBar,
    started_at: Instant,
    bytes: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        Self {
            bar,
            started_at: Instant::now(),
            bytes: 0,
        }
    }

    /// A reporter that draws nothing (`--quiet`, or output is not a terminal)
    pub fn hidden() -> Self {
        let reporter = Self::new();
        reporter.bar.disable_steady_tick();
        reporter.bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Mark start of a copy.
    pub fn start(&mut self, label: &str) {
        self.started_at = Instant::now();
        self.bytes = 0;
        self.bar.set_message(format!("Copying {}...", label));
    }

    /// Update running totals.
    pub fn update(&mut self, files: u64, bytes: u64) {
        self.bytes = bytes;
        self.bar.set_message(format!(
            "{} files | {} | {}/s",
            files,
            HumanBytes(bytes),
            HumanBytes(self.throughput_bps())
        ));
    }

    /// Finalize with the copy summary.
    pub fn finish(&mut self, stats: &CopyStats) {
        self.bytes = stats.bytes;
        self.bar.finish_with_message(format!(
            "Copied {} files, {} directories, {} links | {} | {}/s",
            stats.files,
            stats.directories,
            stats.symlinks,
            HumanBytes(stats.bytes),
            HumanBytes(self.throughput_bps())
        ));
    }

    /// Clear the spinner after a failed copy.
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    fn throughput_bps(&self) -> u64 {
        let secs = self.started_at.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.bytes as f64 / secs) as u64
        } else {
            0
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
