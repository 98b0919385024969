//! Context assembly: system prompt + replayed history + the new query.
//!
//! Assembly is pure and deterministic. The output always has the shape
//!
//! ```text
//! [system, history[0], history[1], ..., history[n-1], new user message]
//! ```
//!
//! so its length is `history.len() + 2` and element 0 is the system message.

use chatdeck_core::context::{ContextMessage, MessageRole};
use chatdeck_core::image::ImagePayload;
use chatdeck_core::message::{Speaker, Turn};

/// How replayed user turns are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Every turn becomes a plain text message.
    TextOnly,
    /// User turns carrying an image become `[text, image]` parts.
    MultiModal,
}

/// Builds the message list sent to a gateway.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    modality: Modality,
}

impl ContextAssembler {
    pub fn new(modality: Modality) -> Self {
        Self { modality }
    }

    pub fn text_only() -> Self {
        Self::new(Modality::TextOnly)
    }

    pub fn multi_modal() -> Self {
        Self::new(Modality::MultiModal)
    }

    pub fn assemble(
        &self,
        system_prompt: &str,
        history: &[Turn],
        new_query: &str,
        new_image: Option<&ImagePayload>,
    ) -> Vec<ContextMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ContextMessage::system(system_prompt));
        messages.extend(history.iter().map(|turn| self.replay(turn)));
        messages.push(match new_image {
            Some(image) => ContextMessage::user_with_image(new_query, image),
            None => ContextMessage::text(MessageRole::User, new_query),
        });
        messages
    }

    fn replay(&self, turn: &Turn) -> ContextMessage {
        match (turn.speaker, self.modality, &turn.image) {
            (Speaker::User, Modality::MultiModal, Some(image)) => {
                ContextMessage::user_with_image(&turn.text, image)
            }
            (speaker, _, _) => ContextMessage::text(speaker.into(), &turn.text),
        }
    }

    /// Incremental input for a continued image conversation: a single user
    /// message `[text]`. Earlier turns live on the service side.
    pub fn continuation(new_query: &str) -> Vec<ContextMessage> {
        vec![ContextMessage::user_parts(new_query)]
    }

    /// Input for the first text-to-image call: the bare query, no system
    /// prompt.
    pub fn first_generation(new_query: &str) -> Vec<ContextMessage> {
        vec![ContextMessage::text(MessageRole::User, new_query)]
    }
}
