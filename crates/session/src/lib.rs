//! Conversation sessions for ChatDeck.
//!
//! One session struct per page. Each owns its [`ConversationStore`]
//! exclusively and runs one interaction at a time:
//!
//! 1. **Load** the system prompt (re-read every turn)
//! 2. **Assemble** the context from the prompt, the stored history and the
//!    new query
//! 3. **Open** the interaction by appending the user turn
//! 4. **Call** the gateway
//! 5. **Close** the interaction: ship both records, append the answer
//!
//! [`ConversationStore`]: chatdeck_core::ConversationStore

pub mod assembler;
pub mod chat;
pub mod imagegen;
pub mod recorder;
#[cfg(test)]
mod test_helpers;
pub mod vision;

pub use assembler::{ContextAssembler, Modality};
pub use chat::{ChatSession, ChatSettings};
pub use imagegen::{ImageGenMode, ImageGenSession};
pub use recorder::TurnRecorder;
pub use vision::VisionSession;
