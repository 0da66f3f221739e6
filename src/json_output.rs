//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (una riga per evento)
//! per chi lancia fasterdl da script o da un'altra applicazione.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della run (cartelle, totale file, backend)
//! - `file_failed`: Un file che non è stato possibile leggere, copiare o comprimere
//! - `complete`: Statistiche finali e path del manifest, se scritto
//! - `error`: Errore fatale di pre-flight

use crate::progress::{FileFailure, RunSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        workers: usize,
        compressor: String,
    },

    #[serde(rename = "file_failed")]
    FileFailed { path: String, error: String },

    #[serde(rename = "complete")]
    Complete {
        total_files: usize,
        finished_files: usize,
        valid_files: usize,
        skipped_files: usize,
        failed_files: usize,
        cancelled_files: usize,
        enumeration_errors: usize,
        uncompressed_bytes: u64,
        compressed_bytes: u64,
        bytes_saved: u64,
        manifest: Option<PathBuf>,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error { message: String },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        workers: usize,
        compressor: &str,
    ) -> Self {
        Self::Start {
            input_dir,
            output_dir,
            total_files,
            workers,
            compressor: compressor.to_string(),
        }
    }

    pub fn file_failed(failure: &FileFailure) -> Self {
        Self::FileFailed {
            path: failure.path.clone(),
            error: failure.error.clone(),
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(summary: &RunSummary, manifest: Option<PathBuf>, duration_seconds: f64) -> Self {
        Self::Complete {
            total_files: summary.total_files,
            finished_files: summary.finished_files,
            valid_files: summary.valid_files,
            skipped_files: summary.skipped_files,
            failed_files: summary.failed_files,
            cancelled_files: summary.cancelled_files,
            enumeration_errors: summary.enumeration_errors.len(),
            uncompressed_bytes: summary.total_input_bytes,
            compressed_bytes: summary.total_output_bytes,
            bytes_saved: summary.bytes_saved(),
            manifest,
            duration_seconds,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_message_shape() {
        let summary = RunSummary {
            total_files: 2,
            finished_files: 2,
            valid_files: 1,
            skipped_files: 1,
            total_input_bytes: 900,
            total_output_bytes: 300,
            ..Default::default()
        };

        let json = serde_json::to_value(JsonMessage::complete(&summary, None, 1.5)).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["valid_files"], 1);
        assert_eq!(json["bytes_saved"], 600);
        assert!(json["manifest"].is_null());
        assert_eq!(json["enumeration_errors"], 0);
    }

    #[test]
    fn test_file_failed_message() {
        let failure = FileFailure {
            path: "/in/models/car.mdl".to_string(),
            error: "Copy error: denied".to_string(),
        };
        let json = serde_json::to_string(&JsonMessage::file_failed(&failure)).unwrap();
        assert!(json.starts_with(r#"{"type":"file_failed""#));
        assert!(json.contains("car.mdl"));
    }
}
