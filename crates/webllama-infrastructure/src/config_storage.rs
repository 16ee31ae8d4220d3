//! Application configuration storage.
//!
//! Loads and saves `AppConfig` as TOML. A missing or empty config file is
//! never an error: built-in defaults apply.

use crate::paths::WebllamaPaths;
use crate::storage::AtomicTextFile;
use std::path::PathBuf;
use webllama_core::Result;
use webllama_core::config::AppConfig;

/// Storage for the application configuration file (config.toml).
pub struct ConfigStorage {
    file: AtomicTextFile,
}

impl ConfigStorage {
    /// Creates a handle for the default path
    /// (`~/.config/webllama/config.toml`).
    pub fn default_location() -> Result<Self> {
        Ok(Self::with_path(WebllamaPaths::config_file()?))
    }

    /// Creates a handle for a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTextFile::new(path),
        }
    }

    /// Loads the configuration, falling back to defaults when the file is
    /// missing or empty.
    ///
    /// # Returns
    ///
    /// - `Ok(AppConfig)`: Parsed or defaulted configuration
    /// - `Err`: The file exists but cannot be read or parsed
    pub fn load(&self) -> Result<AppConfig> {
        match self.file.load()? {
            Some(content) => Ok(toml::from_str(&content)?),
            None => Ok(AppConfig::default()),
        }
    }

    /// Saves the configuration atomically.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        Ok(self.file.save(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use webllama_core::config::DEFAULT_API_URL;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("config.toml"));
        let config = storage.load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.default_model = "meta-llama/llama-3.1-8b-instruct".to_string();
        storage.save(&config).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.default_model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(loaded.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "api_url = [broken").unwrap();

        let storage = ConfigStorage::with_path(path);
        assert!(storage.load().unwrap_err().is_serialization());
    }
}
