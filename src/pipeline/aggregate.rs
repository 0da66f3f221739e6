//! # Aggregate State Module
//!
//! Stato condiviso di una run, aggiornato dai worker e letto dalla progress
//! bar. I contatori osservati dal reporter sono atomici; resource list,
//! byte e fallimenti di un file vengono registrati sotto un unico lock così
//! che contatori e lista restino coerenti.

use crate::pipeline::file_task::FileOutcome;
use crate::progress::{FileFailure, RunSummary};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Ledger {
    resources: Vec<String>,
    failures: Vec<FileFailure>,
    enumeration_errors: Vec<FileFailure>,
    total_input_bytes: u64,
    total_output_bytes: u64,
}

/// Thread-safe accumulator for one run
#[derive(Debug)]
pub struct AggregateState {
    total_files: usize,
    finished_files: AtomicUsize,
    valid_files: AtomicUsize,
    skipped_files: AtomicUsize,
    failed_files: AtomicUsize,
    ledger: Mutex<Ledger>,
}

impl AggregateState {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            finished_files: AtomicUsize::new(0),
            valid_files: AtomicUsize::new(0),
            skipped_files: AtomicUsize::new(0),
            failed_files: AtomicUsize::new(0),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn finished_files(&self) -> usize {
        self.finished_files.load(Ordering::Acquire)
    }

    pub fn valid_files(&self) -> usize {
        self.valid_files.load(Ordering::Acquire)
    }

    /// Completed fraction; an empty run counts as complete
    pub fn progress_ratio(&self) -> f64 {
        if self.total_files == 0 {
            return 1.0;
        }
        self.finished_files() as f64 / self.total_files as f64
    }

    /// Entries the walk could not read; they do not count towards `total_files`
    pub fn record_enumeration_errors(&self, errors: Vec<FileFailure>) {
        self.lock_ledger().enumeration_errors.extend(errors);
    }

    /// Fold one task outcome into the totals
    pub fn record(&self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped => {
                self.skipped_files.fetch_add(1, Ordering::AcqRel);
            }
            FileOutcome::Processed {
                resource_path,
                listed,
                input_bytes,
                output_bytes,
            } => {
                let mut ledger = self.lock_ledger();
                if *listed {
                    ledger.resources.push(resource_path.clone());
                }
                ledger.total_input_bytes += input_bytes;
                ledger.total_output_bytes += output_bytes;
                self.valid_files.fetch_add(1, Ordering::AcqRel);
            }
            FileOutcome::Failed { path, cause } => {
                let mut ledger = self.lock_ledger();
                ledger.failures.push(FileFailure {
                    path: path.clone(),
                    error: cause.clone(),
                });
                self.failed_files.fetch_add(1, Ordering::AcqRel);
            }
        }

        // Last, so a reader never sees completion before the data
        self.finished_files.fetch_add(1, Ordering::AcqRel);
    }

    /// Freeze the totals into a summary; resources come out sorted
    pub fn snapshot(&self) -> RunSummary {
        let ledger = self.lock_ledger();
        let mut resources = ledger.resources.clone();
        resources.sort();

        let finished_files = self.finished_files();

        RunSummary {
            total_files: self.total_files,
            finished_files,
            valid_files: self.valid_files(),
            skipped_files: self.skipped_files.load(Ordering::Acquire),
            failed_files: self.failed_files.load(Ordering::Acquire),
            cancelled_files: self.total_files.saturating_sub(finished_files),
            total_input_bytes: ledger.total_input_bytes,
            total_output_bytes: ledger.total_output_bytes,
            resources,
            failures: ledger.failures.clone(),
            enumeration_errors: ledger.enumeration_errors.clone(),
        }
    }

    fn lock_ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        // Updates under the lock are single pushes or additions
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
