//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file fuori dai worker.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di tutti i file di una directory (`walkdir`)
//! - Creazione idempotente delle directory di destinazione
//! - Preparazione della cartella di output (conflitto / cancellazione)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Operazioni sui file:
//! - `find_all_files()`: Tutti i file sotto la root (symlink inclusi) e le entry illeggibili
//! - `ensure_dir()` / `ensure_parent_dirs()`: create-if-absent, sicure sotto race
//! - `prepare_output_dir()`: Rimuove l'output precedente solo se autorizzato
//! - `output_dir_for()`: `<input>_fasterdl_output`

use crate::error::FastDlError;
use crate::progress::FileFailure;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Suffix of the output tree created next to the input tree
pub const OUTPUT_FOLDER_SUFFIX: &str = "_fasterdl_output";

/// Result of walking an input tree
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    /// Entries that could not be read, never dispatched
    pub errors: Vec<FileFailure>,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find every file under `root`, following symlinks
    pub fn find_all_files(root: &Path) -> Discovery {
        let mut discovery = Discovery::default();

        for entry in WalkDir::new(root).follow_links(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => discovery.files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().unwrap_or(root);
                    warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    discovery.errors.push(FileFailure {
                        path: path.to_string_lossy().replace('\\', "/"),
                        error: e.to_string(),
                    });
                }
            }
        }

        discovery
    }

    /// Output folder paired with an input folder
    pub fn output_dir_for(input_dir: &Path) -> PathBuf {
        let normalized = input_dir.to_string_lossy().replace('\\', "/");
        let trimmed = normalized.strip_suffix('/').unwrap_or(&normalized);
        PathBuf::from(format!("{}{}", trimmed, OUTPUT_FOLDER_SUFFIX))
    }

    /// Create a directory tree, tolerating concurrent creators
    pub fn ensure_dir(dir: &Path) -> Result<(), FastDlError> {
        match std::fs::create_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the parent directories of a file if necessary
    pub fn ensure_parent_dirs(path: &Path) -> Result<(), FastDlError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::ensure_dir(parent),
            _ => Ok(()),
        }
    }

    /// Make sure the output folder is absent, deleting it only when allowed
    pub fn prepare_output_dir(output_dir: &Path, overwrite: bool) -> Result<(), FastDlError> {
        if !output_dir.exists() {
            return Ok(());
        }

        if !overwrite {
            return Err(FastDlError::OutputConflict(output_dir.to_path_buf()));
        }

        info!("Removing previous output folder: {}", output_dir.display());
        std::fs::remove_dir_all(output_dir)?;
        Ok(())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Whole mebibytes, truncated
    pub fn megabytes(size: u64) -> u64 {
        size / 1024 / 1024
    }
}
