//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per trovare il
//! compressore esterno (7-Zip). Il probe viene eseguito una sola volta
//! all'avvio e il risultato passato al resto della pipeline.

use crate::tool_resolver::ToolPathResolver;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;
use tracing::debug;

/// Base names of the 7-Zip executables, in order of preference
const SEVEN_ZIP_CANDIDATES: &[&str] = &["7z", "7zz", "7za"];

/// Platform-specific command manager with tool resolution
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
    tool_resolver: ToolPathResolver,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(|| Self::new(ToolPathResolver::new()))
    }

    /// Build a manager on top of a specific resolver
    pub fn new(tool_resolver: ToolPathResolver) -> Self {
        let mut commands = HashMap::new();
        let which_command = if cfg!(windows) {
            commands.insert("7z", "7z.exe");
            commands.insert("7zz", "7zz.exe");
            commands.insert("7za", "7za.exe");
            "where"
        } else {
            commands.insert("7z", "7z");
            commands.insert("7zz", "7zz");
            commands.insert("7za", "7za");
            "which"
        };

        Self {
            commands,
            which_command,
            tool_resolver,
        }
    }

    /// Get the platform-specific command name
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        self.commands.get(base_name).copied().unwrap_or(base_name)
    }

    /// Locate a command, first via the resolver then via `which`/`where`
    pub fn locate_command(&self, base_name: &str) -> Option<PathBuf> {
        let command_name = self.get_command(base_name);

        if let Some(path) = self.tool_resolver.resolve_tool(command_name) {
            return Some(path);
        }

        let output = Command::new(self.which_command)
            .arg(command_name)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
    }

    /// Probe for an external bzip2-capable archiver
    pub fn find_external_compressor(&self) -> Option<PathBuf> {
        let found = SEVEN_ZIP_CANDIDATES
            .iter()
            .find_map(|candidate| self.locate_command(candidate));

        match &found {
            Some(path) => debug!("External compressor found: {}", path.display()),
            None => debug!("No external compressor found, in-process bzip2 will be used"),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_platform_commands() {
        let platform = PlatformCommands::instance();

        let seven_zip = platform.get_command("7z");
        assert!(seven_zip.starts_with("7z"));
        assert_eq!(platform.get_command("unknown-tool"), "unknown-tool");
    }

    #[cfg(unix)]
    #[test]
    fn test_find_external_compressor_in_custom_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("7za");
        std::fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let platform = PlatformCommands::new(ToolPathResolver::with_search_dirs(vec![
            dir.path().to_path_buf(),
        ]));
        let found = platform.find_external_compressor().unwrap();
        // A system-wide 7z found by `which` would also be acceptable
        assert!(found.file_name().unwrap().to_string_lossy().starts_with("7z"));
    }

    #[test]
    fn test_locate_missing_command() {
        let dir = TempDir::new().unwrap();
        let platform = PlatformCommands::new(ToolPathResolver::with_search_dirs(vec![
            dir.path().to_path_buf(),
        ]));
        assert!(platform.locate_command("fasterdl-no-such-tool").is_none());
    }
}
