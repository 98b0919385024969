//! Configuration loading, validation, and management for ChatDeck.
//!
//! Loads configuration from `~/.chatdeck/config.toml` with `.env` and
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatdeck/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (takes precedence over the secret source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used by the chat and explain pages
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used by the draw and edit pages
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Sampling temperature for chat completions
    #[serde(default)]
    pub temperature: f32,

    /// Max tokens per chat completion (unset = provider default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Replay only the last N turns (unset = full history)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,

    /// Where to look up the API key when `api_key` is not set
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Turn log shipping
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-page settings
    #[serde(default)]
    pub pages: PagesConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Public OpenAI endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_image_model() -> String {
    "gpt-4.1-mini".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("history_window", &self.history_window)
            .field("secrets", &self.secrets)
            .field("logging", &self.logging)
            .field("pages", &self.pages)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// "env", "dir" or "none"
    #[serde(default = "default_secret_source")]
    pub source: String,

    /// Secret name to look up
    #[serde(default = "default_secret_name")]
    pub name: String,

    /// Field holding the key when the secret is a JSON mapping
    #[serde(default = "default_secret_field")]
    pub field: String,

    /// Directory for the "dir" source (default: ~/.chatdeck/secrets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_secret_source() -> String {
    "env".into()
}
fn default_secret_name() -> String {
    "openai-api-key".into()
}
fn default_secret_field() -> String {
    "OPENAI_API_KEY".into()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            source: default_secret_source(),
            name: default_secret_name(),
            field: default_secret_field(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "jsonl", "tracing" or "none"
    #[serde(default = "default_sink")]
    pub sink: String,

    /// Log group (a directory under `dir` for the jsonl sink)
    #[serde(default = "default_log_group")]
    pub group: String,

    /// Root directory for the jsonl sink (default: ~/.chatdeck/logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_sink() -> String {
    "jsonl".into()
}
fn default_log_group() -> String {
    "chatdeck".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            group: default_log_group(),
            dir: None,
        }
    }
}

/// Settings for one page. Unset fields fall back to the page's built-in
/// defaults (see [`AppConfig::page`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    /// System prompt file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PathBuf>,

    /// Log stream name for shipped turn records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stream: Option<String>,

    /// Whether turns are shipped to the log sink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<bool>,

    /// Greeting shown when the session opens (display only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,

    /// Where generated images are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesConfig {
    #[serde(default)]
    pub chat: PageConfig,
    #[serde(default)]
    pub explain: PageConfig,
    #[serde(default)]
    pub draw: PageConfig,
    #[serde(default)]
    pub edit: PageConfig,
}

/// The four interactive pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Chat,
    Explain,
    Draw,
    Edit,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Chat => "chat",
            Page::Explain => "explain",
            Page::Draw => "draw",
            Page::Edit => "edit",
        }
    }

    fn default_prompt(&self) -> Option<&'static str> {
        match self {
            Page::Chat | Page::Explain => Some("prompts/01_sample.md"),
            Page::Draw => None,
            Page::Edit => Some("prompts/04_change.md"),
        }
    }

    fn default_log_stream(&self) -> &'static str {
        match self {
            Page::Chat => "01_chat",
            Page::Explain => "02_image_explain",
            Page::Draw => "03_text2image",
            Page::Edit => "04_image2image",
        }
    }
}

/// A page's settings with defaults applied and paths resolved.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub page: Page,
    pub prompt: Option<PathBuf>,
    pub log_stream: String,
    pub logging: bool,
    pub greeting: Option<String>,
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatdeck/config.toml).
    ///
    /// A `.env` file in the working directory is loaded first. Then:
    /// - `CHATDECK_API_KEY`, then `OPENAI_API_KEY` fill `api_key` if unset
    /// - `CHATDECK_API_URL`, `CHATDECK_CHAT_MODEL`, `CHATDECK_IMAGE_MODEL` override
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path. Relative paths inside
    /// the file resolve against the file's directory.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_dir);

        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self {
                base_dir,
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.base_dir = base_dir;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("CHATDECK_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .filter(|k| !k.trim().is_empty());
        }
        if let Ok(url) = std::env::var("CHATDECK_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("CHATDECK_CHAT_MODEL") {
            self.chat_model = model;
        }
        if let Ok(model) = std::env::var("CHATDECK_IMAGE_MODEL") {
            self.image_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatdeck")
    }

    /// Directory relative paths in this config resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a possibly-relative path against the config directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Settings for `page`, with built-in defaults filled in.
    pub fn page(&self, page: Page) -> ResolvedPage {
        let cfg = match page {
            Page::Chat => &self.pages.chat,
            Page::Explain => &self.pages.explain,
            Page::Draw => &self.pages.draw,
            Page::Edit => &self.pages.edit,
        };

        let prompt = cfg
            .prompt
            .clone()
            .or_else(|| page.default_prompt().map(PathBuf::from))
            .map(|p| self.resolve_path(&p));

        let greeting = match page {
            Page::Chat => cfg
                .greeting
                .clone()
                .or_else(|| Some("Feel free to talk.".into())),
            _ => cfg.greeting.clone(),
        }
        .filter(|g| !g.is_empty());

        ResolvedPage {
            page,
            prompt,
            log_stream: cfg
                .log_stream
                .clone()
                .unwrap_or_else(|| page.default_log_stream().into()),
            logging: cfg.logging.unwrap_or(page == Page::Chat),
            greeting,
            output_dir: self.resolve_path(
                cfg.output_dir
                    .as_deref()
                    .unwrap_or_else(|| Path::new("images")),
            ),
        }
    }

    /// Root directory of the jsonl log sink.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .as_deref()
            .map(|d| self.resolve_path(d))
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }

    /// Directory of the "dir" secret source.
    pub fn secrets_dir(&self) -> PathBuf {
        self.secrets
            .dir
            .as_deref()
            .map(|d| self.resolve_path(d))
            .unwrap_or_else(|| self.base_dir.join("secrets"))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.history_window == Some(0) {
            return Err(ConfigError::ValidationError(
                "history_window must be greater than 0 (omit it to replay the full history)"
                    .into(),
            ));
        }

        if !matches!(self.secrets.source.as_str(), "env" | "dir" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "secrets.source must be one of env, dir, none (got '{}')",
                self.secrets.source
            )));
        }

        if !matches!(self.logging.sink.as_str(), "jsonl" | "tracing" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "logging.sink must be one of jsonl, tracing, none (got '{}')",
                self.logging.sink
            )));
        }

        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_url must not be empty".into()));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            temperature: 0.0,
            max_tokens: None,
            history_window: None,
            secrets: SecretsConfig::default(),
            logging: LoggingConfig::default(),
            pages: PagesConfig::default(),
            base_dir: Self::config_dir(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
