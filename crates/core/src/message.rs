//! Turn and Conversation Store domain types.
//!
//! A session's history is an append-only log of turns:
//! user asks → model answers → both are appended → the whole log is replayed
//! on the next call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::image::ImagePayload;

/// Unique identifier for one interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

/// A single recorded message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,

    /// Empty for pure-image assistant turns.
    #[serde(default)]
    pub text: String,

    /// Present only when an image was supplied or produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,

    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// A user turn without an image.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    /// A user turn carrying the image it was asked about.
    pub fn user_with_image(text: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            image: Some(image),
            ..Self::user(text)
        }
    }

    /// A text answer from the model.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    /// A generated image answer (no text).
    pub fn assistant_image(image: ImagePayload) -> Self {
        Self {
            image: Some(image),
            ..Self::assistant("")
        }
    }
}

/// The ordered, append-only history of one session.
///
/// Insertion order is chronological order is replay order. There is no
/// capacity bound and no eviction; use [`ConversationStore::recent`] to bound
/// what gets replayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. Turns are never reordered or mutated afterwards.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The last `limit` turns, trimmed further so the window never opens on
    /// an assistant turn. `None` returns the full history.
    pub fn recent(&self, limit: Option<usize>) -> &[Turn] {
        let Some(limit) = limit else {
            return &self.turns;
        };

        let start = self.turns.len().saturating_sub(limit);
        let window = &self.turns[start..];
        let skip = window
            .iter()
            .take_while(|t| t.speaker == Speaker::Assistant)
            .count();
        &window[skip..]
    }
}
