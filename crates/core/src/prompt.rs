//! Prompt Loader — where a page's system prompt comes from.
//!
//! The prompt is re-read on every turn, so edits to the file take effect on
//! the next question without restarting the session.

use std::path::PathBuf;
use tracing::debug;

use crate::error::{Error, Result};

/// A read-only text resource addressed by a stable identifier.
pub trait PromptSource: Send + Sync {
    /// Stable identifier, recorded as `prompt_path` in shipped turn logs.
    fn id(&self) -> &str;

    /// The prompt text, verbatim.
    fn load(&self) -> Result<String>;
}

/// A prompt stored in a markdown/text file.
#[derive(Debug, Clone)]
pub struct FilePrompt {
    path: PathBuf,
    id: String,
}

impl FilePrompt {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path.display().to_string();
        Self { path, id }
    }
}

impl PromptSource for FilePrompt {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| Error::Prompt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        debug!(file = %self.path.display(), len = content.len(), "Loaded system prompt");
        Ok(content)
    }
}

/// A fixed prompt string (config override, tests).
#[derive(Debug, Clone)]
pub struct InlinePrompt {
    id: String,
    text: String,
}

impl InlinePrompt {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl PromptSource for InlinePrompt {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}
