//! # Resource Manifest
//!
//! Writes the Lua file that makes the game server push every packaged
//! resource to connecting clients:
//!
//! ```text
//! <output>/lua/autorun/server/fasterdl 2026_14_10 09_30_00.lua
//! resource.AddSingleFile'materials/brick/wall.vmt'
//! resource.AddSingleFile'sound/ambient/wind.wav'
//! ```
//!
//! Entries are written verbatim: forward slashes, no quote escaping.

use crate::config::ManifestMode;
use crate::error::FastDlError;
use crate::file_manager::FileManager;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level folders that identify an addon-format content tree
pub const ADDON_DIRECTORIES: &[&str] = &[
    "maps",
    "materials",
    "models",
    "particles",
    "resource",
    "sound",
];

/// Manifest location relative to the output root
const MANIFEST_DIR: &str = "lua/autorun/server";

pub struct ManifestWriter;

impl ManifestWriter {
    pub fn is_addon_directory(name: &str) -> bool {
        ADDON_DIRECTORIES.contains(&name)
    }

    /// True if any top-level subdirectory of `input_dir` is an addon folder
    pub fn is_addon_layout(input_dir: &Path) -> std::io::Result<bool> {
        for entry in std::fs::read_dir(input_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && Self::is_addon_directory(&entry.file_name().to_string_lossy())
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Decide whether this run writes a manifest
    pub fn should_write(mode: ManifestMode, input_dir: &Path) -> Result<bool, FastDlError> {
        if !mode.is_requested() {
            return Ok(false);
        }

        if Self::is_addon_layout(input_dir)? {
            return Ok(true);
        }

        warn!("Failed to create resource file because the folder was not in addon format!");
        Ok(false)
    }

    pub fn render_entry(resource_path: &str) -> String {
        format!("resource.AddSingleFile'{}'", resource_path)
    }

    /// Write one entry per line to any sink
    pub fn write_entries<W: Write>(mut writer: W, resources: &[String]) -> std::io::Result<()> {
        for resource in resources {
            writeln!(writer, "{}", Self::render_entry(resource))?;
        }
        writer.flush()
    }

    pub fn manifest_path(output_dir: &Path, timestamp: DateTime<Local>) -> PathBuf {
        output_dir.join(MANIFEST_DIR).join(format!(
            "fasterdl {}.lua",
            timestamp.format("%Y_%d_%-m %H_%M_%S")
        ))
    }

    /// Create the manifest under the output tree and return its path
    pub fn write_to_output(output_dir: &Path, resources: &[String]) -> Result<PathBuf, FastDlError> {
        let path = Self::manifest_path(output_dir, Local::now());
        FileManager::ensure_parent_dirs(&path)?;

        let file = File::create(&path)?;
        Self::write_entries(BufWriter::new(file), resources)?;

        info!("Resource file written: {} ({} entries)", path.display(), resources.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_render_entry_is_verbatim() {
        assert_eq!(
            ManifestWriter::render_entry("materials/it's/wall.vmt"),
            "resource.AddSingleFile'materials/it's/wall.vmt'"
        );
    }

    #[test]
    fn test_write_entries() {
        let mut sink = Vec::new();
        let resources = vec!["materials/a.vmt".to_string(), "sound/b.wav".to_string()];
        ManifestWriter::write_entries(&mut sink, &resources).unwrap();

        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "resource.AddSingleFile'materials/a.vmt'\nresource.AddSingleFile'sound/b.wav'\n"
        );
    }

    #[test]
    fn test_manifest_path_format() {
        let timestamp = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        let path = ManifestWriter::manifest_path(Path::new("/out"), timestamp);
        assert_eq!(
            path,
            PathBuf::from("/out/lua/autorun/server/fasterdl 2026_07_3 09_05_01.lua")
        );
    }

    #[test]
    fn test_addon_layout_detection() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("lua")).unwrap();
        std::fs::write(dir.path().join("maps"), b"a file, not a folder").unwrap();
        assert!(!ManifestWriter::is_addon_layout(dir.path()).unwrap());

        std::fs::create_dir_all(dir.path().join("sound")).unwrap();
        assert!(ManifestWriter::is_addon_layout(dir.path()).unwrap());
    }

    #[test]
    fn test_should_write() {
        let dir = TempDir::new().unwrap();
        assert!(!ManifestWriter::should_write(ManifestMode::Enabled, dir.path()).unwrap());

        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        assert!(ManifestWriter::should_write(ManifestMode::Auto, dir.path()).unwrap());
        assert!(ManifestWriter::should_write(ManifestMode::Enabled, dir.path()).unwrap());
        assert!(!ManifestWriter::should_write(ManifestMode::Disabled, dir.path()).unwrap());
    }

    #[test]
    fn test_write_to_output() {
        let dir = TempDir::new().unwrap();
        let resources = vec!["models/car.mdl".to_string()];

        let path = ManifestWriter::write_to_output(dir.path(), &resources).unwrap();
        assert!(path.starts_with(dir.path().join("lua/autorun/server")));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "resource.AddSingleFile'models/car.mdl'\n"
        );
    }
}
