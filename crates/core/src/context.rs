//! Provider-neutral message shapes produced by context assembly.
//!
//! Each gateway maps these onto its own wire format (chat-completions
//! `text`/`image_url` parts, responses `input_text`/`input_image` parts).

use serde::{Deserialize, Serialize};

use crate::image::ImagePayload;
use crate::message::Speaker;

/// Role of a message in the assembled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl From<Speaker> for MessageRole {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => MessageRole::User,
            Speaker::Assistant => MessageRole::Assistant,
        }
    }
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { data_url: String },
}

/// Message body: plain text, or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single message in the context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl ContextMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message shaped as `[text-part, image-part]`.
    pub fn user_with_image(text: impl Into<String>, image: &ImagePayload) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::Image {
                    data_url: image.data_url(),
                },
            ]),
        }
    }

    /// A user message shaped as `[text-part]`.
    pub fn user_parts(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts(vec![ContentPart::Text { text: text.into() }]),
        }
    }

    /// The text portion of the message (first text part for multi-part bodies).
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Image { .. } => None,
            }),
        }
    }

    pub fn has_image(&self) -> bool {
        matches!(&self.content, MessageContent::Parts(parts)
            if parts.iter().any(|p| matches!(p, ContentPart::Image { .. })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_message_is_text_then_image() {
        let img = ImagePayload::encode(b"pixels");
        let msg = ContextMessage::user_with_image("what is this?", &img);
        let MessageContent::Parts(parts) = &msg.content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], ContentPart::Text { text } if text == "what is this?"));
        assert!(matches!(&parts[1], ContentPart::Image { data_url } if data_url == &img.data_url()));
        assert!(msg.has_image());
    }

    #[test]
    fn text_content_of_plain_and_parts() {
        assert_eq!(ContextMessage::system("rules").text_content(), Some("rules"));
        assert_eq!(ContextMessage::user_parts("hi").text_content(), Some("hi"));
        assert!(!ContextMessage::user_parts("hi").has_image());
    }

    #[test]
    fn role_from_speaker() {
        assert_eq!(MessageRole::from(Speaker::User), MessageRole::User);
        assert_eq!(MessageRole::from(Speaker::Assistant).as_str(), "assistant");
    }
}
