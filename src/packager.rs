//! # Packager
//!
//! Orchestratore di una run completa:
//! 1. Pre-flight: validazione config, directory di input, conflitto output
//! 2. Selezione del backend di compressione (probe già eseguito dal chiamante)
//! 3. Pipeline concorrente tramite `Coordinator`
//! 4. Manifest Lua e statistiche finali

use crate::compressor::{select_compressor, Compressor};
use crate::config::Config;
use crate::error::FastDlError;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::manifest::ManifestWriter;
use crate::pipeline::{Coordinator, CoordinatorOptions};
use crate::progress::RunSummary;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Everything a caller needs after a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub output_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub compressor: &'static str,
    pub duration: Duration,
}

pub struct Packager {
    config: Config,
    input_dir: PathBuf,
    output_dir: PathBuf,
    compressor: Arc<dyn Compressor>,
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl Packager {
    /// Pre-flight checks; `external_tool` is the result of the compressor probe
    pub fn new(input_dir: &Path, config: Config, external_tool: Option<PathBuf>) -> Result<Self> {
        config.validate()?;

        if !input_dir.is_dir() {
            return Err(FastDlError::InvalidInputDirectory(input_dir.to_path_buf()).into());
        }

        let compressor = select_compressor(config.compressor, external_tool)?;

        Ok(Self {
            output_dir: FileManager::output_dir_for(input_dir),
            input_dir: input_dir.to_path_buf(),
            config,
            compressor,
            stop_receiver: None,
        })
    }

    /// Stop dispatching new files once a signal arrives
    pub fn with_cancellation(mut self, stop_receiver: broadcast::Receiver<()>) -> Self {
        self.stop_receiver = Some(stop_receiver);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the run would need permission to delete a previous output
    pub fn has_output_conflict(&self) -> bool {
        self.output_dir.exists() && !self.config.overwrite_output
    }

    /// Grant permission to delete a previous output folder
    pub fn allow_overwrite(&mut self) {
        self.config.overwrite_output = true;
    }

    /// Esegue la run completa
    pub async fn run(mut self) -> Result<RunReport> {
        let start_time = Instant::now();

        FileManager::prepare_output_dir(&self.output_dir, self.config.overwrite_output)?;

        let options = CoordinatorOptions {
            workers: self.config.workers,
            progress_interval: Duration::from_millis(self.config.progress_interval_ms),
            show_progress: self.config.show_progress && !self.config.json_output,
        };

        let mut coordinator = match self.stop_receiver.take() {
            Some(receiver) => {
                Coordinator::with_cancellation(&self.input_dir, self.compressor.clone(), options, receiver)
            }
            None => Coordinator::new(&self.input_dir, self.compressor.clone(), options),
        };

        let discovery = coordinator.enumerate();
        self.emit_start_message(discovery.files.len());

        let summary = coordinator.process(discovery).await?;

        let manifest = self.write_manifest(&summary)?;
        let duration = start_time.elapsed();

        self.print_final_stats(&summary, manifest.as_deref(), duration);

        Ok(RunReport {
            summary,
            output_dir: self.output_dir,
            manifest,
            compressor: self.compressor.name(),
            duration,
        })
    }

    fn emit_start_message(&self, total_files: usize) {
        if self.config.json_output {
            JsonMessage::start(
                self.input_dir.clone(),
                self.output_dir.clone(),
                total_files,
                self.config.workers,
                self.compressor.name(),
            )
            .emit();
        } else {
            info!("Packaging {} into {}", self.input_dir.display(), self.output_dir.display());
            info!("Workers: {} | Backend: {}", self.config.workers, self.compressor.name());
        }
    }

    fn write_manifest(&self, summary: &RunSummary) -> Result<Option<PathBuf>> {
        if !ManifestWriter::should_write(self.config.manifest, &self.input_dir)? {
            return Ok(None);
        }

        if summary.cancelled_files > 0 {
            warn!("Run was cancelled, resource file not written");
            return Ok(None);
        }

        Ok(Some(ManifestWriter::write_to_output(&self.output_dir, &summary.resources)?))
    }

    fn print_final_stats(&self, summary: &RunSummary, manifest: Option<&Path>, duration: Duration) {
        if self.config.json_output {
            for failure in summary.enumeration_errors.iter().chain(&summary.failures) {
                JsonMessage::file_failed(failure).emit();
            }
            JsonMessage::complete(summary, manifest.map(Path::to_path_buf), duration.as_secs_f64()).emit();
            return;
        }

        for line in summary.format_report().lines() {
            info!("{}", line);
        }
        info!("{} in {:.1}s", summary.format_summary(), duration.as_secs_f64());
    }
}
