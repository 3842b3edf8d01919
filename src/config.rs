//! Application configuration management.
//!
//! Settings are merged in layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. TOML file (`--config FILE`, else `config.toml` in the platform config dir)
//! 3. environment variables prefixed `TUNETIDY_` (`__` separates nested keys,
//!    e.g. `TUNETIDY_SUGGESTER__MODEL`)
//! 4. command-line flags, applied by the caller
//!
//! The suggestion API key may also come from `OPENAI_API_KEY`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::suggest::OpenAiConfig;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TUNETIDY_";

/// Fallback environment variable for the suggestion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),

    /// The effective configuration could not be rendered as TOML.
    #[error("Cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Name suggester settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggesterConfig {
    /// Use the suggestion service when tags are missing.
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Suggestion cache file (defaults to the platform cache dir).
    pub cache_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        let openai = OpenAiConfig::default();
        Self {
            enabled: true,
            api_base: openai.api_base,
            model: openai.model,
            timeout_secs: openai.timeout.as_secs(),
            cache_path: None,
            api_key: None,
        }
    }
}

impl SuggesterConfig {
    /// Backend settings derived from this section.
    #[must_use]
    pub fn openai(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }

    /// Cache file location: configured path, platform cache dir, or `ai_cache.json`.
    #[must_use]
    pub fn resolved_cache_path(&self) -> PathBuf {
        if let Some(ref path) = self.cache_path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.cache_dir().join("suggestions.json"))
            .unwrap_or_else(|| PathBuf::from("ai_cache.json"))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions considered by the duplicate scan.
    pub extensions: Vec<String>,
    /// Extensions considered by the renamer and tag inspection.
    pub rename_extensions: Vec<String>,
    /// Root directory for quarantine sessions.
    pub trash_dir: PathBuf,
    /// Directory for JSON and text logs.
    pub log_dir: PathBuf,
    /// Fingerprinter read size in bytes.
    pub chunk_size: usize,
    /// Hashing threads.
    pub io_threads: usize,
    /// Naming pattern with `{artist}` and `{title}`.
    pub rename_pattern: String,
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    /// Gitignore-style patterns excluded from scans.
    pub ignore_patterns: Vec<String>,
    pub suggester: SuggesterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string()],
            rename_extensions: vec!["mp3".to_string(), "wav".to_string()],
            trash_dir: PathBuf::from("trash"),
            log_dir: PathBuf::from("logs"),
            chunk_size: crate::scanner::DEFAULT_CHUNK_SIZE,
            io_threads: 4,
            rename_pattern: crate::rename::DEFAULT_PATTERN.to_string(),
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            suggester: SuggesterConfig::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tunetidy", "tunetidy")
}

impl Config {
    /// Default platform-specific config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment without extracting it.
    ///
    /// A missing default config file is silently skipped.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file.map(Path::to_path_buf).or_else(Self::default_path) {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from all layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `file` is given but missing, and
    /// `ConfigError::Invalid` if any layer fails to parse.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let mut config: Config = Self::figment(file).extract()?;
        if config.suggester.api_key.is_none() {
            config.suggester.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        log::debug!("Effective configuration: {:?}", config.redacted());
        Ok(config)
    }

    /// Copy of this configuration with secrets removed.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.suggester.api_key.is_some() {
            copy.suggester.api_key = Some("<redacted>".to_string());
        }
        copy
    }

    /// Render the effective configuration as TOML (secrets redacted).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Render` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}
