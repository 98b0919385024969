//! Secret sources and API key resolution.
//!
//! A secret is stored either as the bare key or as a JSON mapping that
//! contains the key under a named field. Both shapes are accepted.

use async_trait::async_trait;
use chatdeck_core::error::SecretError;
use chatdeck_core::secret::SecretSource;
use std::path::PathBuf;
use tracing::debug;

/// Reads secrets from environment variables.
///
/// The secret name is mapped to a variable name by upper-casing it and
/// replacing `-` and `.` with `_` (`openai-api-key` → `OPENAI_API_KEY`).
#[derive(Debug, Default)]
pub struct EnvSecretSource;

impl EnvSecretSource {
    pub fn new() -> Self {
        Self
    }

    pub fn var_name(secret_name: &str) -> String {
        secret_name
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    fn name(&self) -> &str {
        "env"
    }

    async fn fetch(&self, secret_name: &str) -> Result<String, SecretError> {
        let var = Self::var_name(secret_name);
        std::env::var(&var).map_err(|e| SecretError::FetchFailed {
            name: secret_name.into(),
            reason: format!("{var}: {e}"),
        })
    }
}

/// Reads secrets from files in a directory, one file per secret name.
#[derive(Debug)]
pub struct DirSecretSource {
    dir: PathBuf,
}

impl DirSecretSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SecretSource for DirSecretSource {
    fn name(&self) -> &str {
        "dir"
    }

    async fn fetch(&self, secret_name: &str) -> Result<String, SecretError> {
        if secret_name.contains(['/', '\\']) || secret_name.starts_with('.') {
            return Err(SecretError::FetchFailed {
                name: secret_name.into(),
                reason: "secret names must be plain file names".into(),
            });
        }

        let path = self.dir.join(secret_name);
        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| SecretError::FetchFailed {
                    name: secret_name.into(),
                    reason: format!("{}: {e}", path.display()),
                })?;

        debug!(file = %path.display(), "Read secret file");
        Ok(content.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// The interpreted shape of a stored secret.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    /// The value itself (non-JSON text or a JSON string)
    Plain(String),
    /// A JSON object of named fields
    Structured(serde_json::Map<String, serde_json::Value>),
    /// Valid JSON of any other type
    Unsupported(serde_json::Value),
}

impl SecretValue {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => SecretValue::Structured(map),
            Ok(serde_json::Value::String(s)) => SecretValue::Plain(s),
            Ok(other) => SecretValue::Unsupported(other),
            Err(_) => SecretValue::Plain(raw.to_string()),
        }
    }

    /// The key: the named field of a mapping, or the plain value.
    pub fn extract(&self, field: &str) -> Option<&str> {
        match self {
            SecretValue::Plain(s) => Some(s.as_str()),
            SecretValue::Structured(map) => map.get(field).and_then(|v| v.as_str()),
            SecretValue::Unsupported(_) => None,
        }
    }
}

/// Fetch `secret_name` from `source` and pull the API key out of it.
///
/// Absence of a usable key is a fatal configuration error for the session.
pub async fn resolve_api_key(
    source: &dyn SecretSource,
    secret_name: &str,
    field: &str,
) -> Result<String, SecretError> {
    let raw = source.fetch(secret_name).await?;
    let value = SecretValue::parse(&raw);

    match value.extract(field) {
        Some(key) if !key.trim().is_empty() => {
            debug!(source = source.name(), secret = secret_name, "Resolved API key");
            Ok(key.to_string())
        }
        _ => Err(SecretError::Missing {
            name: secret_name.into(),
            field: field.into(),
        }),
    }
}

/// Display wrapper that never prints the wrapped secret.
pub struct Redacted<'a>(pub &'a str);

impl std::fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(3).collect();
        if self.0.chars().count() > 8 {
            write!(f, "{prefix}***")
        } else {
            write!(f, "***")
        }
    }
}

impl std::fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
