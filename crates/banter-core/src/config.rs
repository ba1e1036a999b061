//! Configuration management for banter.
//!
//! Loads configuration from ${BANTER_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for banter configuration and data directories.
    //!
    //! BANTER_HOME resolution order:
    //! 1. BANTER_HOME environment variable (if set)
    //! 2. ~/.config/banter (default)

    use std::path::PathBuf;

    /// Returns the banter home directory.
    ///
    /// Checks BANTER_HOME env var first, falls back to ~/.config/banter
    pub fn banter_home() -> PathBuf {
        if let Ok(home) = std::env::var("BANTER_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("banter"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        banter_home().join("config.toml")
    }

    /// Returns the directory that receives log files.
    pub fn logs_dir() -> PathBuf {
        banter_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model tag sent with every chat request
    pub model: String,

    /// Optional chat backend base URL (overridden by BANTER_BASE_URL)
    pub base_url: Option<String>,
}

impl Config {
    const DEFAULT_MODEL: &str = "gpt-4o-mini";
    const DEFAULT_BASE_URL: &str = "http://localhost:8000";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the effective backend base URL.
    ///
    /// Resolution order: BANTER_BASE_URL env var > config file > default.
    /// Empty/whitespace values are treated as unset. The chosen URL is
    /// validated for well-formedness.
    pub fn effective_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("BANTER_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        if let Some(config_url) = self.base_url.as_deref() {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                Self::validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        Ok(Self::DEFAULT_BASE_URL.to_string())
    }

    fn validate_url(url: &str) -> Result<()> {
        url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {}", url))?;
        Ok(())
    }

    /// Saves only the model field to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_model(model: &str) -> Result<()> {
        Self::save_model_to(&paths::config_path(), model)
    }

    /// Saves only the model field to a specific config file path.
    pub fn save_model_to(path: &Path, model: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["model"] = value(model);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "model = \"o3-mini\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "o3-mini");
        assert_eq!(config.base_url, None); // default preserved
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("gpt-4o-mini"));
        assert!(contents.contains("base_url"));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_loaded_from_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "base_url = \"https://chat.example.com\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://chat.example.com"));
    }

    #[test]
    fn test_base_url_empty_falls_back_to_default() {
        let config = Config {
            base_url: Some("   ".to_string()),
            ..Default::default()
        };
        // Note: relies on BANTER_BASE_URL being unset in the test environment.
        if std::env::var("BANTER_BASE_URL").is_err() {
            assert_eq!(config.effective_base_url().unwrap(), "http://localhost:8000");
        }
    }

    #[test]
    fn test_base_url_invalid_is_rejected() {
        let config = Config {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        if std::env::var("BANTER_BASE_URL").is_err() {
            assert!(config.effective_base_url().is_err());
        }
    }

    #[test]
    fn test_save_model_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_model_to(&config_path, "o3-mini").unwrap();

        assert!(config_path.exists());

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "o3-mini");

        // Template comments are preserved
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# banter configuration"));
    }

    #[test]
    fn test_save_model_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"model = "old-model"
base_url = "https://chat.example.com"
"#,
        )
        .unwrap();

        Config::save_model_to(&config_path, "gpt-4o-mini").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url.as_deref(), Some("https://chat.example.com")); // preserved
    }

    #[test]
    fn test_save_model_preserves_comments() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"# My config file
model = "old-model"
"#,
        )
        .unwrap();

        Config::save_model_to(&config_path, "o3-mini").unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# My config file"));
        assert!(contents.contains("o3-mini"));
    }

    #[test]
    fn test_save_model_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("dir").join("config.toml");

        Config::save_model_to(&config_path, "o3-mini").unwrap();

        assert!(config_path.exists());
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.model, "o3-mini");
    }
}
