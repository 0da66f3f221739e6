//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress reporting e le statistiche finali.
//!
//! ## Componenti principali:
//! - `ProgressReporter`: Task osservatore che legge i contatori condivisi ogni
//!   ~100ms e aggiorna la progress bar `indicatif`
//! - `RunSummary`: Statistiche congelate a fine run
//!
//! ## Terminazione:
//! Il reporter si ferma da solo appena il rapporto finished/total raggiunge
//! 1.0 (0/0 conta come completo), oppure quando riceve lo stop signal sul
//! canale broadcast. Non viene mai abortito dall'esterno.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [########################>---------------] 312/520 (60%)
//! ```

use crate::file_manager::FileManager;
use crate::pipeline::aggregate::AggregateState;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

/// Observer task rendering progress from the shared counters
pub struct ProgressReporter {
    handle: JoinHandle<f64>,
    stop_sender: broadcast::Sender<()>,
}

impl ProgressReporter {
    /// Start observing `state` every `interval`
    pub fn spawn(state: Arc<AggregateState>, interval: Duration, visible: bool) -> Self {
        let bar = if visible {
            Self::styled_bar(state.total_files() as u64)
        } else {
            ProgressBar::hidden()
        };

        let (stop_sender, stop_receiver) = broadcast::channel(1);
        let handle = tokio::spawn(Self::observe(state, bar, interval, stop_receiver));

        Self {
            handle,
            stop_sender,
        }
    }

    fn styled_bar(total_files: u64) -> ProgressBar {
        let bar = ProgressBar::new(total_files);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:50.green/white}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message("Running...");
        bar
    }

    async fn observe(
        state: Arc<AggregateState>,
        bar: ProgressBar,
        interval: Duration,
        mut stop_receiver: broadcast::Receiver<()>,
    ) -> f64 {
        let mut ticker = tokio::time::interval(interval);
        let mut ticks = 0u64;

        loop {
            ticker.tick().await;
            ticks += 1;

            bar.set_position(state.finished_files() as u64);
            let ratio = state.progress_ratio();

            if ratio >= 1.0 {
                bar.finish_with_message("Complete");
                debug!("Progress reporter finished after {} ticks", ticks);
                return ratio;
            }

            if Self::should_stop(&mut stop_receiver) {
                bar.abandon_with_message("Stopped");
                debug!("Progress reporter stopped at {:.1}%", ratio * 100.0);
                return ratio;
            }
        }
    }

    fn should_stop(receiver: &mut broadcast::Receiver<()>) -> bool {
        match receiver.try_recv() {
            Ok(_) => true,
            Err(broadcast::error::TryRecvError::Empty) => false,
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Closed) => true,
        }
    }

    /// Ask the observer to stop at its next tick and wait for it.
    /// Returns the last ratio it observed.
    pub async fn finish(self) -> f64 {
        let _ = self.stop_sender.send(());
        self.handle.await.unwrap_or(0.0)
    }

    /// Wait for the observer to reach 100% on its own
    pub async fn wait(self) -> f64 {
        let Self { handle, stop_sender } = self;
        let ratio = handle.await.unwrap_or(0.0);
        drop(stop_sender);
        ratio
    }
}

/// A file that could not be copied or compressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Final statistics of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub finished_files: usize,
    pub valid_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    /// Never dispatched because the run was cancelled
    pub cancelled_files: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub resources: Vec<String>,
    pub failures: Vec<FileFailure>,
    /// Entries skipped during discovery because they could not be read
    pub enumeration_errors: Vec<FileFailure>,
}

impl RunSummary {
    pub fn bytes_saved(&self) -> u64 {
        self.total_input_bytes.saturating_sub(self.total_output_bytes)
    }

    pub fn reduction_percent(&self) -> f64 {
        if self.total_input_bytes > 0 {
            (self.bytes_saved() as f64 / self.total_input_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Compressed: {}/{} files | Useless: {} | Failed: {} | Saved: {} ({:.2}%)",
            self.valid_files,
            self.finished_files,
            self.skipped_files,
            self.failed_files,
            FileManager::format_size(self.bytes_saved()),
            self.reduction_percent()
        )
    }

    /// Multi-line block printed at the end of a run
    pub fn format_report(&self) -> String {
        let mut lines = vec![
            "Complete:".to_string(),
            format!("   Compressed files: {}/{}", self.valid_files, self.finished_files),
            format!("   Useless files: {}", self.skipped_files),
            format!("   Failed files: {}", self.failed_files),
            format!("   Uncompressed Size: {}mb", FileManager::megabytes(self.total_input_bytes)),
            format!("   Compressed Size: {}mb", FileManager::megabytes(self.total_output_bytes)),
            format!("   Total Saved: {}mb", FileManager::megabytes(self.bytes_saved())),
        ];

        if !self.enumeration_errors.is_empty() {
            lines.push(format!("   Unreadable entries: {}", self.enumeration_errors.len()));
        }

        if self.cancelled_files > 0 {
            lines.push(format!("   Cancelled files: {}", self.cancelled_files));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::file_task::FileOutcome;

    #[tokio::test]
    async fn test_reporter_stops_immediately_on_empty_run() {
        let state = Arc::new(AggregateState::new(0));
        let reporter = ProgressReporter::spawn(state, Duration::from_millis(10), false);
        assert_eq!(reporter.wait().await, 1.0);
    }

    #[tokio::test]
    async fn test_reporter_follows_counters_to_completion() {
        let state = Arc::new(AggregateState::new(3));
        let reporter = ProgressReporter::spawn(state.clone(), Duration::from_millis(5), false);

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(15)).await;
            state.record(&FileOutcome::Skipped);
        }

        assert_eq!(reporter.wait().await, 1.0);
    }

    #[tokio::test]
    async fn test_reporter_cooperative_stop() {
        let state = Arc::new(AggregateState::new(10));
        state.record(&FileOutcome::Skipped);

        let reporter = ProgressReporter::spawn(state, Duration::from_millis(5), false);
        let ratio = reporter.finish().await;
        assert!((ratio - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_math() {
        let summary = RunSummary {
            finished_files: 5,
            valid_files: 3,
            skipped_files: 2,
            total_input_bytes: 10 * 1024 * 1024,
            total_output_bytes: 4 * 1024 * 1024,
            ..Default::default()
        };

        assert_eq!(summary.bytes_saved(), 6 * 1024 * 1024);
        assert!((summary.reduction_percent() - 60.0).abs() < 1e-9);

        let report = summary.format_report();
        assert!(report.contains("Compressed files: 3/5"));
        assert!(report.contains("Useless files: 2"));
        assert!(report.contains("Total Saved: 6mb"));
        assert!(!report.contains("Cancelled"));
        assert!(!report.contains("Unreadable"));
    }

    #[test]
    fn test_report_lists_unreadable_entries() {
        let summary = RunSummary {
            enumeration_errors: vec![FileFailure {
                path: "/in/sound".to_string(),
                error: "Permission denied".to_string(),
            }],
            ..Default::default()
        };
        assert!(summary.format_report().contains("Unreadable entries: 1"));
    }

    #[test]
    fn test_bytes_saved_never_underflows() {
        let summary = RunSummary {
            total_input_bytes: 10,
            total_output_bytes: 50,
            ..Default::default()
        };
        assert_eq!(summary.bytes_saved(), 0);
        assert_eq!(RunSummary::default().reduction_percent(), 0.0);
    }
}
