//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di una run
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `workers`: Numero di worker paralleli (default: core disponibili - 1, minimo 1)
//! - `overwrite_output`: Cancella la cartella di output esistente senza chiedere (default: false)
//! - `manifest`: Generazione del file resource Lua (default: Auto)
//! - `compressor`: Backend di compressione (default: Auto = 7-Zip se presente)
//! - `json_output`: Eventi JSON al posto della progress bar (default: false)
//! - `show_progress`: Mostra la progress bar (default: true)
//! - `progress_interval_ms`: Cadenza di refresh della progress bar (default: 100)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     workers: 8,
//!     overwrite_output: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::FastDlError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether the Lua resource manifest should be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestMode {
    /// Written when the input tree is in addon layout
    Auto,
    /// Requested explicitly; still requires the addon layout
    Enabled,
    /// Never written
    Disabled,
}

impl ManifestMode {
    /// Maps the legacy `0|1` positional argument
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Auto,
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Which compression backend a run should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressorPreference {
    /// External 7-Zip when found on the system, in-process bzip2 otherwise
    Auto,
    InProcess,
    External,
}

/// Configuration for one packaging run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of parallel workers
    pub workers: usize,
    /// Delete a pre-existing output folder without asking
    pub overwrite_output: bool,
    /// Resource manifest generation
    pub manifest: ManifestMode,
    /// Compression backend
    pub compressor: CompressorPreference,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Render the progress bar
    pub show_progress: bool,
    /// Progress refresh cadence in milliseconds
    pub progress_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            overwrite_output: false,
            manifest: ManifestMode::Auto,
            compressor: CompressorPreference::Auto,
            json_output: false,
            show_progress: true,
            progress_interval_ms: 100,
        }
    }
}

/// Available parallelism minus one, leaving a core free for the host
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(FastDlError::Validation("Number of workers must be greater than 0".to_string()).into());
        }

        if self.progress_interval_ms == 0 {
            return Err(FastDlError::Validation("Progress interval must be greater than 0".to_string()).into());
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
