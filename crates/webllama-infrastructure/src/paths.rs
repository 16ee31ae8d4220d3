//! Unified path management for WebLlama files.
//!
//! All configuration, persisted state, and preview artifacts live under
//! platform-appropriate directories resolved through the `dirs` crate.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/webllama/          # Config directory
//! ├── config.toml              # Application configuration
//! └── state/                   # Key-value state files
//!     ├── webllama_history.json
//!     └── webllama_current_state.json
//!
//! ~/.local/share/webllama/     # Data directory
//! ├── previews/                # Composed preview documents
//! └── exports/                 # Default export destination
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for webllama_core::WebllamaError {
    fn from(err: PathError) -> Self {
        webllama_core::WebllamaError::io(err.to_string())
    }
}

/// Unified path management for WebLlama.
pub struct WebllamaPaths;

impl WebllamaPaths {
    /// Returns the WebLlama configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/webllama/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("webllama"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the WebLlama data directory.
    ///
    /// Used for larger, regenerable files (previews, exports).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join("webllama"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding key-value state files.
    pub fn state_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("state"))
    }

    /// Returns the directory holding composed preview documents.
    pub fn previews_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("previews"))
    }

    /// Returns the default export destination directory.
    pub fn exports_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = WebllamaPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("webllama"));
    }

    #[test]
    fn test_config_file() {
        let config_file = WebllamaPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = WebllamaPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_state_dir() {
        let state_dir = WebllamaPaths::state_dir().unwrap();
        assert!(state_dir.ends_with("state"));
        let config_dir = WebllamaPaths::config_dir().unwrap();
        assert!(state_dir.starts_with(&config_dir));
    }

    #[test]
    fn test_previews_dir() {
        let previews_dir = WebllamaPaths::previews_dir().unwrap();
        assert!(previews_dir.ends_with("previews"));
        let data_dir = WebllamaPaths::data_dir().unwrap();
        assert!(previews_dir.starts_with(&data_dir));
    }

    #[test]
    fn test_exports_dir() {
        let exports_dir = WebllamaPaths::exports_dir().unwrap();
        assert!(exports_dir.ends_with("exports"));
    }
}
