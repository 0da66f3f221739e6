//! # Coordinator
//!
//! Orchestratore della pipeline classify-copy-compress:
//!
//! ```text
//! Idle -> Enumerating -> Dispatching -> Draining -> Finalized
//! ```
//!
//! - `Enumerating`: lista completa dei file, il totale è noto prima di partire
//! - `Dispatching`: un `spawn_blocking` per file, al massimo `workers` in volo
//!   (semaforo), in ordine di enumerazione
//! - `Draining`: barriera, attende ogni task lanciato
//! - `Finalized`: lo stato aggregato viene congelato in un `RunSummary`

use crate::compressor::Compressor;
use crate::file_manager::{Discovery, FileManager};
use crate::pipeline::aggregate::AggregateState;
use crate::pipeline::file_task::{FileOutcome, FileTask};
use crate::progress::{ProgressReporter, RunSummary};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Enumerating,
    Dispatching,
    Draining,
    Finalized,
}

/// Knobs the coordinator needs from the run configuration
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub workers: usize,
    pub progress_interval: Duration,
    pub show_progress: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            workers: crate::config::default_workers(),
            progress_interval: Duration::from_millis(100),
            show_progress: false,
        }
    }
}

pub struct Coordinator {
    input_dir: PathBuf,
    options: CoordinatorOptions,
    task: Arc<FileTask>,
    stop_receiver: Option<broadcast::Receiver<()>>,
    state: PipelineState,
}

impl Coordinator {
    pub fn new(input_dir: &Path, compressor: Arc<dyn Compressor>, options: CoordinatorOptions) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            task: Arc::new(FileTask::new(input_dir, compressor)),
            options,
            stop_receiver: None,
            state: PipelineState::Idle,
        }
    }

    /// Same as `new`, stopping dispatch when a signal arrives on `stop_receiver`
    pub fn with_cancellation(
        input_dir: &Path,
        compressor: Arc<dyn Compressor>,
        options: CoordinatorOptions,
        stop_receiver: broadcast::Receiver<()>,
    ) -> Self {
        let mut coordinator = Self::new(input_dir, compressor, options);
        coordinator.stop_receiver = Some(stop_receiver);
        coordinator
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn should_stop(&mut self) -> bool {
        if let Some(ref mut receiver) = self.stop_receiver {
            match receiver.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => return true,
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return false,
            }
        }
        false
    }

    /// Enumerate the list of files under the input directory
    pub fn enumerate(&mut self) -> Discovery {
        self.transition(PipelineState::Enumerating);
        let discovery = FileManager::find_all_files(&self.input_dir);
        info!("Found {} files in {}", discovery.files.len(), self.input_dir.display());
        discovery
    }

    /// Run every stage once. A finalized coordinator cannot be run again.
    pub async fn run(&mut self) -> Result<RunSummary> {
        if self.state != PipelineState::Idle {
            return Err(anyhow::anyhow!("Pipeline already started (state {:?})", self.state));
        }

        let discovery = self.enumerate();
        self.process(discovery).await
    }

    /// Dispatch, drain and finalize an already enumerated file list
    pub async fn process(&mut self, discovery: Discovery) -> Result<RunSummary> {
        let Discovery { files, errors } = discovery;
        let state = Arc::new(AggregateState::new(files.len()));
        state.record_enumeration_errors(errors);
        let reporter = ProgressReporter::spawn(
            state.clone(),
            self.options.progress_interval,
            self.options.show_progress,
        );

        let handles = self.dispatch(files, &state).await?;
        self.drain(handles, &state).await;

        reporter.finish().await;

        self.transition(PipelineState::Finalized);
        Ok(state.snapshot())
    }

    async fn dispatch(
        &mut self,
        files: Vec<PathBuf>,
        state: &Arc<AggregateState>,
    ) -> Result<Vec<(PathBuf, JoinHandle<FileOutcome>)>> {
        self.transition(PipelineState::Dispatching);

        let workers = self.options.workers.max(1);
        debug!("🔧 Dispatching {} files over {} workers", files.len(), workers);

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(files.len());

        for path in files {
            if self.should_stop() {
                warn!("Stop signal received, no further files will be dispatched");
                break;
            }

            let permit = semaphore.clone().acquire_owned().await?;
            let task = self.task.clone();
            let state = state.clone();
            let task_path = path.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let outcome = task.process(&task_path);
                state.record(&outcome);
                outcome
            });

            handles.push((path, handle));
        }

        Ok(handles)
    }

    async fn drain(
        &mut self,
        handles: Vec<(PathBuf, JoinHandle<FileOutcome>)>,
        state: &Arc<AggregateState>,
    ) {
        self.transition(PipelineState::Draining);

        for (path, handle) in handles {
            match handle.await {
                Ok(FileOutcome::Failed { path, cause }) => {
                    warn!("Failed to process {}: {}", path, cause);
                }
                Ok(_) => {}
                Err(e) => {
                    // The worker never reached `record`
                    let outcome = FileOutcome::Failed {
                        path: path.to_string_lossy().replace('\\', "/"),
                        cause: format!("worker panicked: {}", e),
                    };
                    warn!("Worker for {} panicked: {}", path.display(), e);
                    state.record(&outcome);
                }
            }
        }
    }
}
