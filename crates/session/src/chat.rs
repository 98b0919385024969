//! Text chat: replay the whole conversation on every call.

use std::sync::Arc;

use chatdeck_core::error::Result;
use chatdeck_core::message::{ConversationStore, SessionId, Turn};
use chatdeck_core::prompt::PromptSource;
use chatdeck_core::provider::{ChatProvider, ChatRequest};
use chatdeck_core::sink::LogSink;
use tracing::debug;

use crate::assembler::ContextAssembler;
use crate::recorder::TurnRecorder;

/// Model parameters shared by the chat and vision sessions.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Replay only the last N turns (`None` = everything)
    pub history_window: Option<usize>,
}

impl ChatSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            history_window: None,
        }
    }

    pub(crate) fn request(&self, messages: Vec<chatdeck_core::ContextMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    prompt: Arc<dyn PromptSource>,
    settings: ChatSettings,
    assembler: ContextAssembler,
    recorder: TurnRecorder,
    store: ConversationStore,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        prompt: Arc<dyn PromptSource>,
        settings: ChatSettings,
    ) -> Self {
        let recorder = TurnRecorder::new(SessionId::new(), prompt.id());
        Self {
            provider,
            prompt,
            settings,
            assembler: ContextAssembler::text_only(),
            recorder,
            store: ConversationStore::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, stream: impl Into<String>) -> Self {
        self.recorder = self.recorder.with_sink(sink, stream);
        self
    }

    /// Prepare the log stream. Call once before the first `submit`.
    pub async fn start(&self) -> Result<()> {
        self.recorder.setup().await
    }

    /// Run one interaction and return the answer.
    ///
    /// On error the user turn may remain unpaired in the store.
    pub async fn submit(&mut self, query: &str) -> Result<String> {
        let system_prompt = self.prompt.load()?;
        let messages = self.assembler.assemble(
            &system_prompt,
            self.store.recent(self.settings.history_window),
            query,
            None,
        );

        let user = Turn::user(query);
        self.recorder.open(&mut self.store, user.clone());

        debug!(
            session = %self.recorder.session_id(),
            messages = messages.len(),
            "Chat turn"
        );
        let response = self
            .provider
            .complete(self.settings.request(messages))
            .await?;

        self.recorder
            .close(&mut self.store, &user, Turn::assistant(&response.content))
            .await?;
        Ok(response.content)
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn session_id(&self) -> &SessionId {
        self.recorder.session_id()
    }
}
