//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `FastDlError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori fatali di pre-flight da errori per singolo file
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `InvalidInputDirectory`, `OutputConflict`, `MissingDependency`, `Validation`:
//!   fatali, interrompono la run prima di qualsiasi elaborazione
//! - `InvalidPath`, `Copy`, `Compression`, `Io`: per singolo file, il file viene
//!   contato come fallito e la run continua
//!
//! ## Esempio:
//! ```rust,ignore
//! if !input.is_dir() {
//!     return Err(FastDlError::InvalidInputDirectory(input.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for asset packaging
#[derive(thiserror::Error, Debug)]
pub enum FastDlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid directory: {}", .0.display())]
    InvalidInputDirectory(PathBuf),

    #[error("Output folder already exists: {}", .0.display())]
    OutputConflict(PathBuf),

    #[error("Path {path} does not lie under base folder {base}")]
    InvalidPath { base: String, path: String },

    #[error("Copy error: {0}")]
    Copy(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl FastDlError {
    /// True for errors that abort the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidInputDirectory(_)
                | Self::OutputConflict(_)
                | Self::MissingDependency(_)
                | Self::Validation(_)
        )
    }
}
