//! # Compression Module
//!
//! Produces the `.bz2` artefact served to clients. Two interchangeable
//! backends sit behind the [`Compressor`] trait:
//!
//! | Backend | Quando |
//! |---------|--------|
//! | [`SevenZipCompressor`] | 7-Zip trovato dal probe all'avvio |
//! | [`Bzip2Compressor`] | fallback in-process, nessuna dipendenza esterna |
//!
//! The backend is chosen once per run by [`select_compressor`] and shared by
//! every worker through an `Arc<dyn Compressor>`.

use crate::args;
use crate::config::CompressorPreference;
use crate::error::FastDlError;
use crate::file_manager::FileManager;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Transfer buffer used when streaming a file through the encoder
pub const TRANSFER_BUFFER_SIZE: usize = 4096;

/// Suffix appended to the original file name for the compressed artefact
pub const COMPRESSED_SUFFIX: &str = ".bz2";

/// Turns a source file into a bzip2 artefact at `destination`.
///
/// Implementations run synchronously on a worker thread and must create the
/// destination directory if it is missing.
pub trait Compressor: Send + Sync {
    fn compress(&self, source: &Path, destination: &Path) -> Result<(), FastDlError>;

    /// Short backend name for logs and the JSON start event
    fn name(&self) -> &'static str;
}

/// In-process bzip2 at maximum level
#[derive(Debug, Default, Clone)]
pub struct Bzip2Compressor;

impl Compressor for Bzip2Compressor {
    fn compress(&self, source: &Path, destination: &Path) -> Result<(), FastDlError> {
        FileManager::ensure_parent_dirs(destination)?;

        let mut input = File::open(source).map_err(|e| {
            FastDlError::Compression(format!("Failed to open {}: {}", source.display(), e))
        })?;
        let output = File::create(destination).map_err(|e| {
            FastDlError::Compression(format!("Failed to create {}: {}", destination.display(), e))
        })?;

        let mut encoder = BzEncoder::new(BufWriter::new(output), Compression::best());
        let mut buffer = [0u8; TRANSFER_BUFFER_SIZE];

        loop {
            let read = input.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            encoder.write_all(&buffer[..read])?;
        }

        let mut writer = encoder.finish().map_err(|e| {
            FastDlError::Compression(format!("bzip2 stream for {} failed: {}", source.display(), e))
        })?;
        writer.flush()?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "bzip2"
    }
}

/// External 7-Zip process, one single-threaded invocation per file
#[derive(Debug, Clone)]
pub struct SevenZipCompressor {
    executable: PathBuf,
}

impl SevenZipCompressor {
    pub fn new(executable: PathBuf) -> Self {
        Self { executable }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// `a -tbzip2 -mx=9 -mmt=off`: bzip2 container, max level, no internal threads
    fn build_args(source: &Path, destination: &Path) -> Vec<String> {
        args![
            "a",
            "-tbzip2",
            "-mx=9",
            "-mmt=off",
            "-y",
            "-bso0",
            "-bsp0",
            destination.display(),
            source.display(),
        ]
    }
}

impl Compressor for SevenZipCompressor {
    fn compress(&self, source: &Path, destination: &Path) -> Result<(), FastDlError> {
        FileManager::ensure_parent_dirs(destination)?;

        let args = Self::build_args(source, destination);
        debug!("Running {} {}", self.executable.display(), args.join(" "));

        let output = Command::new(&self.executable)
            .args(&args)
            .output()
            .map_err(|e| {
                FastDlError::Compression(format!(
                    "Failed to execute {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(FastDlError::Compression(format!(
                "{} exited with {} for {}: {}",
                self.executable.display(),
                output.status,
                source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "7zip"
    }
}

/// Pick the backend for the whole run from the preference and the probe result
pub fn select_compressor(
    preference: CompressorPreference,
    external_tool: Option<PathBuf>,
) -> Result<Arc<dyn Compressor>, FastDlError> {
    let compressor: Arc<dyn Compressor> = match (preference, external_tool) {
        (CompressorPreference::InProcess, _) => Arc::new(Bzip2Compressor),
        (CompressorPreference::Auto, None) => Arc::new(Bzip2Compressor),
        (CompressorPreference::Auto | CompressorPreference::External, Some(path)) => {
            let seven_zip = SevenZipCompressor::new(path);
            info!("🔧 External compressor: {}", seven_zip.executable().display());
            Arc::new(seven_zip)
        }
        (CompressorPreference::External, None) => {
            return Err(FastDlError::MissingDependency(
                "7-Zip is required for external compression".to_string(),
            ))
        }
    };

    info!("🔧 Compression backend: {}", compressor.name());
    Ok(compressor)
}
