//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path: da una base folder e un
//! path assoluto costruisce un `FileRecord` immutabile con relative folder,
//! resource path e path di output già calcolati.

use crate::compressor::COMPRESSED_SUFFIX;
use crate::error::FastDlError;
use crate::file_manager::OUTPUT_FOLDER_SUFFIX;
use std::path::PathBuf;

/// One discovered file with every derived path computed up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub absolute_path: String,
    pub base_folder: String,
    /// Empty when the file sits directly under the base folder
    pub relative_folder: String,
    pub file_name: String,
    /// Without the leading dot, empty if the name has none
    pub extension: String,
}

impl FileRecord {
    /// Manifest key: `relative_folder/file_name`.
    /// A file directly under the base folder yields just `file_name`, with no leading slash
    pub fn resource_path(&self) -> String {
        Self::join(&self.relative_folder, &self.file_name)
    }

    pub fn output_base_folder(&self) -> String {
        format!("{}{}", self.base_folder, OUTPUT_FOLDER_SUFFIX)
    }

    /// Uncompressed mirror copy under the output tree
    pub fn output_copy_path(&self) -> PathBuf {
        PathBuf::from(format!("{}/{}", self.output_base_folder(), self.resource_path()))
    }

    /// Compressed artefact next to the mirror copy
    pub fn output_compressed_path(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}/{}{}",
            self.output_base_folder(),
            self.resource_path(),
            COMPRESSED_SUFFIX
        ))
    }

    /// `base_folder/relative_folder/file_name`, equal to `absolute_path`
    pub fn reconstruct_absolute_path(&self) -> String {
        format!("{}/{}", self.base_folder, self.resource_path())
    }

    fn join(folder: &str, name: &str) -> String {
        if folder.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", folder, name)
        }
    }
}

/// Utility per calcolare i path in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Forward slashes only, no trailing slash
    pub fn normalize_base(base_folder: &str) -> String {
        let mut normalized = base_folder.replace('\\', "/");
        if normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        normalized
    }

    /// Split `absolute_path` into base, relative folder and file name
    pub fn resolve(base_folder: &str, absolute_path: &str) -> Result<FileRecord, FastDlError> {
        let base_folder = Self::normalize_base(base_folder);
        let absolute_path = absolute_path.replace('\\', "/");

        let invalid = || FastDlError::InvalidPath {
            base: base_folder.clone(),
            path: absolute_path.clone(),
        };

        let prefix = if base_folder.ends_with('/') {
            base_folder.clone()
        } else {
            format!("{}/", base_folder)
        };
        let rest = absolute_path.strip_prefix(&prefix).ok_or_else(invalid)?;

        let (relative_folder, file_name) = match rest.rfind('/') {
            Some(index) => (&rest[..index], &rest[index + 1..]),
            None => ("", rest),
        };

        if file_name.is_empty() {
            return Err(invalid());
        }

        let extension = match file_name.rfind('.') {
            Some(index) if index > 0 => file_name[index + 1..].to_string(),
            _ => String::new(),
        };

        Ok(FileRecord {
            relative_folder: relative_folder.to_string(),
            file_name: file_name.to_string(),
            extension,
            absolute_path,
            base_folder,
        })
    }
}
