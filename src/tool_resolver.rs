//! # Tool Path Resolver
//!
//! Finds external executables in:
//! - Directories listed in `PATH`
//! - Well-known install locations (e.g. `C:\Program Files\7-Zip`)
//! - Directories given explicitly (tests, `FASTERDL_TOOLS_DIR`)

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tool path resolver over an ordered list of search directories
pub struct ToolPathResolver {
    search_dirs: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Resolver over the override dir, `PATH` and the platform install dirs
    pub fn new() -> Self {
        let mut search_dirs = Vec::new();

        if let Ok(tools_dir) = env::var("FASTERDL_TOOLS_DIR") {
            search_dirs.push(PathBuf::from(tools_dir));
        }

        if let Some(path) = env::var_os("PATH") {
            search_dirs.extend(env::split_paths(&path));
        }

        search_dirs.extend(Self::install_dirs());

        Self { search_dirs }
    }

    /// Resolver that only looks in the given directories
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    fn install_dirs() -> Vec<PathBuf> {
        if cfg!(windows) {
            ["ProgramFiles", "ProgramFiles(x86)", "ProgramW6432"]
                .iter()
                .filter_map(|var| env::var_os(var))
                .map(|root| PathBuf::from(root).join("7-Zip"))
                .collect()
        } else if cfg!(target_os = "macos") {
            vec![PathBuf::from("/opt/homebrew/bin"), PathBuf::from("/usr/local/bin")]
        } else {
            vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")]
        }
    }

    /// Resolve the path to a specific executable (already platform-named)
    pub fn resolve_tool(&self, executable: &str) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            let candidate = dir.join(executable);
            if Self::is_executable(&candidate) {
                debug!("Resolved tool {} -> {}", executable, candidate.display());
                return Some(candidate);
            }
        }

        debug!("Tool {} not found in {} search dirs", executable, self.search_dirs.len());
        None
    }

    /// Check if an executable can be found
    pub fn is_tool_available(&self, executable: &str) -> bool {
        self.resolve_tool(executable).is_some()
    }

    #[cfg(unix)]
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(path: &Path) -> bool {
        path.is_file()
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_tool() {
        let dir = TempDir::new().unwrap();
        let resolver = ToolPathResolver::with_search_dirs(vec![dir.path().to_path_buf()]);
        assert!(resolver.resolve_tool("7z").is_none());
        assert!(!resolver.is_tool_available("7z"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_executable_in_search_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("7z");
        std::fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = ToolPathResolver::with_search_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve_tool("7z"), Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("7z"), "not a program").unwrap();

        let resolver = ToolPathResolver::with_search_dirs(vec![dir.path().to_path_buf()]);
        assert!(resolver.resolve_tool("7z").is_none());
    }
}
