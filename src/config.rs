//! Configuration management for Synopsis
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Precedence, lowest to highest: defaults, YAML file, `SYNOPSIS_*`
//! environment variables, command-line flags.

use crate::attachment::MAX_ATTACHMENT_BYTES;
use crate::error::{Result, SynopsisError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Summary lengths accepted by the summarize endpoints
pub const SUMMARY_LENGTHS: [&str; 3] = ["short", "medium", "detailed"];

/// Main configuration structure for Synopsis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Summarize view defaults
    #[serde(default)]
    pub summarize: SummarizeConfig,
    /// Chat view settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Where the bearer token and cached user are kept
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Versioned API root, e.g. `http://localhost:8000/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Summarize request defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// One of `short`, `medium`, `detailed`
    #[serde(default = "default_length")]
    pub default_length: String,

    #[serde(default = "default_max_length")]
    pub max_length: u32,

    #[serde(default = "default_min_length")]
    pub min_length: u32,

    /// File name used when downloading a summary without an explicit path
    #[serde(default = "default_download_file_name")]
    pub download_file_name: String,
}

fn default_length() -> String {
    "medium".to_string()
}

fn default_max_length() -> u32 {
    150
}

fn default_min_length() -> u32 {
    50
}

fn default_download_file_name() -> String {
    "summary.txt".to_string()
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            default_length: default_length(),
            max_length: default_max_length(),
            min_length: default_min_length(),
            download_file_name: default_download_file_name(),
        }
    }
}

/// Chat view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Title given to sessions created by the client
    #[serde(default = "default_session_title")]
    pub default_session_title: String,

    /// Largest attachment accepted before upload (bytes, default: 10 MB)
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
}

fn default_session_title() -> String {
    "New conversation".to_string()
}

fn default_max_attachment_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_session_title: default_session_title(),
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

/// Credential storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS keyring (Keychain, Secret Service, Credential Manager)
    #[default]
    Keyring,
    /// JSON file in the user data directory
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = SynopsisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => Err(SynopsisError::Config(format!(
                "Invalid storage backend: {}. Must be one of: keyring, file",
                other
            ))),
        }
    }
}

/// Credential storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Override for the file backend location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, then apply env and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            api: ApiConfig::default(),
            summarize: SummarizeConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(SynopsisError::Yaml)?;
        tracing::debug!("Loaded configuration from {}", path);
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SYNOPSIS_API_URL") {
            tracing::debug!(base_url = %base_url, "Env override: SYNOPSIS_API_URL");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SYNOPSIS_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SYNOPSIS_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("SYNOPSIS_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(value) => self.storage.backend = value,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if let Ok(path) = std::env::var("SYNOPSIS_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(length) = std::env::var("SYNOPSIS_SUMMARY_LENGTH") {
            self.summarize.default_length = length.to_lowercase();
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api.base_url = api_url.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            SynopsisError::Config(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SynopsisError::Config(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(SynopsisError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !SUMMARY_LENGTHS.contains(&self.summarize.default_length.as_str()) {
            return Err(SynopsisError::Config(format!(
                "Invalid summarize.default_length: {}. Must be one of: {}",
                self.summarize.default_length,
                SUMMARY_LENGTHS.join(", ")
            ))
            .into());
        }

        if self.summarize.min_length > self.summarize.max_length {
            return Err(SynopsisError::Config(
                "summarize.min_length must not exceed summarize.max_length".to_string(),
            )
            .into());
        }

        if self.summarize.download_file_name.trim().is_empty() {
            return Err(SynopsisError::Config(
                "summarize.download_file_name cannot be empty".to_string(),
            )
            .into());
        }

        if self.chat.max_attachment_bytes == 0 {
            return Err(SynopsisError::Config(
                "chat.max_attachment_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.max_attachment_bytes > MAX_ATTACHMENT_BYTES {
            return Err(SynopsisError::Config(format!(
                "chat.max_attachment_bytes cannot exceed {} bytes (10 MB)",
                MAX_ATTACHMENT_BYTES
            ))
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
