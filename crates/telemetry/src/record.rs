//! The structured copy of a turn that gets shipped to a log sink.

use chatdeck_core::message::{SessionId, Turn};
use serde::{Deserialize, Serialize};

/// One shipped turn.
///
/// Serialized as a single JSON object; non-ASCII text is written verbatim.
/// Images are referenced by digest, never embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnLogRecord {
    /// Session identifier
    pub id: String,

    /// "user" or "assistant"
    pub role: String,

    /// Identifier of the system prompt the session runs with
    pub prompt_path: String,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TurnLogRecord {
    pub fn from_turn(session: &SessionId, prompt_path: &str, turn: &Turn) -> Self {
        Self {
            id: session.0.clone(),
            role: turn.speaker.as_str().into(),
            prompt_path: prompt_path.into(),
            content: turn.text.clone(),
            image: turn.image.as_ref().map(|img| img.reference()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
