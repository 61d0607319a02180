//! Progress reporting for batch operations
//!
//! Provides a progress bar wrapper for batch operations using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress indicator for batch operations
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Create a new progress indicator for batch operations
    pub fn new(total: u64, operation: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓▒░"),
        );
        bar.set_message(format!("{} ", operation));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Increment the progress by one
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
