//! Wiring shared by the page commands: config, credentials, sinks, prompts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chatdeck_config::{AppConfig, ResolvedPage};
use chatdeck_core::image::check_upload_extension;
use chatdeck_core::prompt::{FilePrompt, PromptSource};
use chatdeck_core::secret::SecretSource;
use chatdeck_core::sink::LogSink;
use chatdeck_security::{DirSecretSource, EnvSecretSource, Redacted, resolve_api_key};
use chatdeck_session::ChatSettings;
use chatdeck_telemetry::{JsonlSink, TracingSink};
use tracing::{debug, info};

pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config() -> CmdResult<AppConfig> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The configured secret source, if any.
pub fn secret_source(config: &AppConfig) -> Option<Box<dyn SecretSource>> {
    match config.secrets.source.as_str() {
        "env" => Some(Box::new(EnvSecretSource::new())),
        "dir" => Some(Box::new(DirSecretSource::new(config.secrets_dir()))),
        _ => None,
    }
}

/// Config/env key first, then the secret source. No key is fatal.
pub async fn api_key(config: &AppConfig) -> CmdResult<String> {
    if let Some(key) = &config.api_key {
        debug!(key = %Redacted(key), "Using API key from config/environment");
        return Ok(key.clone());
    }

    let lookup = match secret_source(config) {
        Some(source) => {
            resolve_api_key(source.as_ref(), &config.secrets.name, &config.secrets.field)
                .await
                .map(|key| {
                    info!(
                        source = source.name(),
                        secret = %config.secrets.name,
                        "API key resolved from secret source"
                    );
                    key
                })
                .map_err(|e| e.to_string())
        }
        None => Err("secret source disabled".to_string()),
    };

    lookup.map_err(|reason| {
        eprintln!();
        eprintln!("  ERROR: No API key configured! ({reason})");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!("    CHATDECK_API_KEY = 'sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        "No API key found. See above for setup instructions.".into()
    })
}

/// The log sink for `page`, or `None` when its turns are not shipped.
pub fn log_sink(config: &AppConfig, page: &ResolvedPage) -> Option<Arc<dyn LogSink>> {
    if !page.logging {
        return None;
    }
    match config.logging.sink.as_str() {
        "jsonl" => Some(Arc::new(JsonlSink::new(
            config.log_dir(),
            &config.logging.group,
        ))),
        "tracing" => Some(Arc::new(TracingSink::new())),
        _ => None,
    }
}

/// A command-line prompt path wins over the page's configured one.
pub fn prompt_source(
    page: &ResolvedPage,
    override_path: Option<PathBuf>,
) -> CmdResult<Arc<dyn PromptSource>> {
    let path = override_path
        .or_else(|| page.prompt.clone())
        .ok_or_else(|| format!("No system prompt configured for the {} page", page.page.name()))?;
    Ok(Arc::new(FilePrompt::new(path)))
}

pub fn chat_settings(config: &AppConfig) -> ChatSettings {
    ChatSettings {
        model: config.chat_model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        history_window: config.history_window,
    }
}

/// Read an uploaded image after checking its extension.
pub async fn read_image(path: &Path) -> CmdResult<Vec<u8>> {
    check_upload_extension(path).map_err(chatdeck_core::Error::from)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(bytes)
}
