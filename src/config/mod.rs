use crate::error::{Admx2OmaError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_LANGUAGE: &str = "en-us";
pub const OUTPUT_FORMATS: &[&str] = &["table", "csv", "json"];

/// Persistent settings, stored as `config.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Language folder holding the ADML companions
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_format")]
    pub format: String,

    /// `tracing` filter used when not running verbose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            output_dir: None,
            format: default_format(),
            log_level: None,
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_format() -> String {
    "table".to_string()
}

impl Config {
    /// Update one setting by name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "language" => {
                if value.trim().is_empty() {
                    return Err(Admx2OmaError::ConfigError("language cannot be empty".into()));
                }
                self.language = value.trim().to_string();
            }
            "output_dir" => {
                self.output_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "format" => {
                if !OUTPUT_FORMATS.contains(&value) {
                    return Err(Admx2OmaError::ConfigError(format!(
                        "Unknown format '{}' (expected one of: {})",
                        value,
                        OUTPUT_FORMATS.join(", ")
                    )));
                }
                self.format = value.to_string();
            }
            "log_level" => {
                self.log_level = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            other => {
                return Err(Admx2OmaError::ConfigError(format!(
                    "Unknown setting '{}' (expected language, output_dir, format or log_level)",
                    other
                )));
            }
        }
        Ok(())
    }
}

/// Configuration manager
#[derive(Clone, Debug)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "admx2oma", "admx2oma").ok_or_else(|| {
            Admx2OmaError::ConfigError("Failed to determine config directory".into())
        })?;

        Ok(Self::with_dir(project_dirs.config_dir().to_path_buf()))
    }

    /// Manager rooted at an explicit directory
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Load config, falling back to defaults when no file exists
    pub fn load_config(&self) -> Result<Config> {
        let config_path = self.config_file();

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`Self::load_config`], but an unreadable or malformed file is
    /// logged and replaced by defaults
    pub fn load_config_or_default(&self) -> Config {
        self.load_config().unwrap_or_else(|e| {
            warn!(
                "Ignoring config at {}: {}",
                self.config_file().display(),
                e
            );
            Config::default()
        })
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }

        let contents = toml::to_string_pretty(config).map_err(|e| {
            Admx2OmaError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;
        fs::write(self.config_file(), contents)?;
        Ok(())
    }
}
