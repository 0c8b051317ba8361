use std::path::Path;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::chunk_planner::{DEFAULT_CHAR_BUDGET, DEFAULT_FILE_SIZE_LIMIT};
use crate::deepl::client::DEFAULT_ENDPOINT;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO 639-1)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// DeepL service configuration
    #[serde(default)]
    pub deepl: DeepLConfig,

    /// Plex media-server configuration, optional
    #[serde(default)]
    pub plex: Option<PlexConfig>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// DeepL service section
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeepLConfig {
    // @field: API key; may be filled from the environment at the CLI edge
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Seconds between status polls
    #[serde(default = "default_polling_interval_secs")]
    pub polling_interval_secs: u64,

    // @field: Poll cap; null means wait forever
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: Option<u32>,

    // @field: Approximate character budget per chunk
    #[serde(default = "default_chunk_char_budget")]
    pub chunk_char_budget: usize,

    // @field: Exact byte ceiling per uploaded file
    #[serde(default = "default_chunk_file_size_limit")]
    pub chunk_file_size_limit: usize,
}

/// Plex media-server section; a library refresh is fired after a
/// successful translation when this is present
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlexConfig {
    // @field: Plex host name or address
    pub host: String,

    // @field: Plex port
    #[serde(default = "default_plex_port")]
    pub port: u16,

    // @field: X-Plex-Token
    pub token: String,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "es".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_polling_interval_secs() -> u64 {
    5
}

fn default_max_poll_attempts() -> Option<u32> {
    Some(120)
}

fn default_chunk_char_budget() -> usize {
    DEFAULT_CHAR_BUDGET
}

fn default_chunk_file_size_limit() -> usize {
    DEFAULT_FILE_SIZE_LIMIT
}

fn default_plex_port() -> u16 {
    32400
}

impl Default for DeepLConfig {
    fn default() -> Self {
        DeepLConfig {
            api_key: String::new(),
            endpoint: default_endpoint(),
            polling_interval_secs: default_polling_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            chunk_char_budget: default_chunk_char_budget(),
            chunk_file_size_limit: default_chunk_file_size_limit(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            deepl: DeepLConfig::default(),
            plex: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration before use
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if self.source_language.eq_ignore_ascii_case(&self.target_language) {
            return Err(anyhow!(
                "Source and target language are both '{}'",
                self.source_language
            ));
        }

        if self.deepl.api_key.is_empty() {
            return Err(anyhow!(
                "DeepL API key is required (config 'deepl.api_key' or the DEEPL_API_KEY environment variable)"
            ));
        }

        if self.deepl.chunk_file_size_limit == 0 || self.deepl.chunk_char_budget == 0 {
            return Err(anyhow!("Chunk size limits must be greater than zero"));
        }

        Ok(())
    }
}
