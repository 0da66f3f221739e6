//! # File Task Module
//!
//! Worker per l'elaborazione di un singolo file:
//! resolve → classify → copy → compress → measure.
//! Gira interamente su un thread bloccante; gli errori restano confinati al
//! file e diventano `FileOutcome::Failed`.

use crate::classifier::Classifier;
use crate::compressor::Compressor;
use crate::error::FastDlError;
use crate::file_manager::FileManager;
use crate::pipeline::path_resolver::{FileRecord, PathResolver};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Result of processing one discovered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Not distributable, nothing was written
    Skipped,
    /// Copied and compressed into the output tree
    Processed {
        resource_path: String,
        /// False for maps, which stay out of the manifest
        listed: bool,
        input_bytes: u64,
        output_bytes: u64,
    },
    Failed { path: String, cause: String },
}

/// Per-file unit of work shared by all workers
pub struct FileTask {
    base_folder: String,
    compressor: Arc<dyn Compressor>,
}

impl FileTask {
    pub fn new(base_folder: &Path, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            base_folder: PathResolver::normalize_base(&base_folder.to_string_lossy()),
            compressor,
        }
    }

    /// Processa un singolo file
    pub fn process(&self, absolute_path: &Path) -> FileOutcome {
        let display_path = absolute_path.to_string_lossy().replace('\\', "/");

        match self.try_process(absolute_path) {
            Ok(outcome) => outcome,
            Err(e) => FileOutcome::Failed {
                path: display_path,
                cause: e.to_string(),
            },
        }
    }

    fn try_process(&self, absolute_path: &Path) -> Result<FileOutcome, FastDlError> {
        let path_str = absolute_path.to_str().ok_or_else(|| FastDlError::InvalidPath {
            base: self.base_folder.clone(),
            path: absolute_path.to_string_lossy().to_string(),
        })?;

        let record = PathResolver::resolve(&self.base_folder, path_str)?;

        if !Classifier::is_eligible(&record.extension, &record.file_name) {
            debug!("Useless file skipped: {}", record.resource_path());
            return Ok(FileOutcome::Skipped);
        }

        self.copy(absolute_path, &record)?;

        let copy_path = record.output_copy_path();
        let compressed_path = record.output_compressed_path();
        self.compressor.compress(&copy_path, &compressed_path)?;

        let input_bytes = std::fs::metadata(&copy_path)?.len();
        let output_bytes = std::fs::metadata(&compressed_path)?.len();

        debug!(
            "[OK] {} {} -> {}",
            record.resource_path(),
            FileManager::format_size(input_bytes),
            FileManager::format_size(output_bytes)
        );

        Ok(FileOutcome::Processed {
            resource_path: record.resource_path(),
            listed: Classifier::is_listed(&record.extension),
            input_bytes,
            output_bytes,
        })
    }

    /// Mirror copy, must exist before compression reads it
    fn copy(&self, source: &Path, record: &FileRecord) -> Result<(), FastDlError> {
        let destination = record.output_copy_path();
        FileManager::ensure_parent_dirs(&destination)?;

        std::fs::copy(source, &destination).map_err(|e| {
            FastDlError::Copy(format!(
                "{} -> {}: {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::Bzip2Compressor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct FailingCompressor;

    impl Compressor for FailingCompressor {
        fn compress(&self, _source: &Path, _destination: &Path) -> Result<(), FastDlError> {
            Err(FastDlError::Compression("simulated failure".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("addon");
        std::fs::create_dir_all(input.join("maps")).unwrap();
        std::fs::create_dir_all(input.join("materials")).unwrap();
        std::fs::write(input.join("maps/test.bsp"), vec![b'V'; 4096]).unwrap();
        std::fs::write(input.join("materials/wall.vmt"), b"\"LightmappedGeneric\" {}").unwrap();
        std::fs::write(input.join("materials/skip.txt"), b"notes").unwrap();
        (dir, input)
    }

    fn output_of(input: &Path) -> PathBuf {
        FileManager::output_dir_for(input)
    }

    #[test]
    fn test_processed_file_writes_copy_and_artefact() {
        let (_dir, input) = fixture();
        let task = FileTask::new(&input, Arc::new(Bzip2Compressor));

        let outcome = task.process(&input.join("materials/wall.vmt"));
        let output = output_of(&input);

        match outcome {
            FileOutcome::Processed {
                resource_path,
                listed,
                input_bytes,
                output_bytes,
            } => {
                assert_eq!(resource_path, "materials/wall.vmt");
                assert!(listed);
                assert_eq!(input_bytes, 23);
                assert_eq!(output_bytes, std::fs::metadata(output.join("materials/wall.vmt.bz2")).unwrap().len());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(output.join("materials/wall.vmt").is_file());
    }

    #[test]
    fn test_map_is_processed_but_not_listed() {
        let (_dir, input) = fixture();
        let task = FileTask::new(&input, Arc::new(Bzip2Compressor));

        let outcome = task.process(&input.join("maps/test.bsp"));
        assert!(matches!(outcome, FileOutcome::Processed { listed: false, input_bytes: 4096, .. }));
        assert!(output_of(&input).join("maps/test.bsp.bz2").is_file());
    }

    #[test]
    fn test_useless_file_writes_nothing() {
        let (_dir, input) = fixture();
        let task = FileTask::new(&input, Arc::new(Bzip2Compressor));

        assert_eq!(task.process(&input.join("materials/skip.txt")), FileOutcome::Skipped);
        assert!(!output_of(&input).exists());
    }

    #[test]
    fn test_compression_failure_is_reported() {
        let (_dir, input) = fixture();
        let task = FileTask::new(&input, Arc::new(FailingCompressor));

        match task.process(&input.join("materials/wall.vmt")) {
            FileOutcome::Failed { path, cause } => {
                assert!(path.ends_with("materials/wall.vmt"));
                assert!(cause.contains("simulated failure"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_copy_failure_is_reported() {
        let (_dir, input) = fixture();
        let task = FileTask::new(&input, Arc::new(Bzip2Compressor));

        let outcome = task.process(&input.join("materials/vanished.vtf"));
        assert!(matches!(outcome, FileOutcome::Failed { ref cause, .. } if cause.starts_with("Copy error")));
    }

    /// Stand-in archiver: records its argv and writes a fixed payload to the destination
    #[cfg(unix)]
    fn fake_seven_zip(dir: &Path, argv_log: &Path) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("7z");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nprintf 'BZh91AY' > \"$8\"\n",
            argv_log.display()
        );
        {
            let mut file = std::fs::File::create(&script).unwrap();
            file.write_all(body.as_bytes()).unwrap();
            file.sync_all().unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_external_archiver_reads_the_mirror_copy() {
        use crate::compressor::SevenZipCompressor;

        let (dir, input) = fixture();
        let argv_log = dir.path().join("argv.log");
        let script = fake_seven_zip(dir.path(), &argv_log);
        let task = FileTask::new(&input, Arc::new(SevenZipCompressor::new(script)));

        let source = input.join("materials/wall.vmt");
        let outcome = task.process(&source);
        let record = PathResolver::resolve(&input.to_string_lossy(), &source.to_string_lossy()).unwrap();

        let argv = std::fs::read_to_string(&argv_log).unwrap();
        let argv: Vec<&str> = argv.lines().collect();
        assert_eq!(argv.len(), 9);
        assert_eq!(argv[0], "a");
        assert_eq!(argv[7], record.output_compressed_path().to_string_lossy());
        assert_eq!(argv[8], record.output_copy_path().to_string_lossy());
        assert_ne!(argv[8], source.to_string_lossy());

        assert_eq!(
            outcome,
            FileOutcome::Processed {
                resource_path: "materials/wall.vmt".to_string(),
                listed: true,
                input_bytes: 23,
                output_bytes: 7,
            }
        );
        assert_eq!(std::fs::read(record.output_compressed_path()).unwrap(), b"BZh91AY");
    }

    #[test]
    fn test_path_outside_base_is_a_file_failure() {
        let (dir, input) = fixture();
        let stray = dir.path().join("stray.vmt");
        std::fs::write(&stray, b"x").unwrap();

        let task = FileTask::new(&input, Arc::new(Bzip2Compressor));
        assert!(matches!(task.process(&stray), FileOutcome::Failed { .. }));
    }
}
