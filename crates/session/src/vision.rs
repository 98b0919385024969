//! Vision chat: questions about an attached image.

use std::sync::Arc;

use chatdeck_core::error::Result;
use chatdeck_core::image::ImagePayload;
use chatdeck_core::message::{ConversationStore, SessionId, Turn};
use chatdeck_core::prompt::PromptSource;
use chatdeck_core::provider::ChatProvider;
use chatdeck_core::sink::LogSink;
use tracing::debug;

use crate::assembler::ContextAssembler;
use crate::chat::ChatSettings;
use crate::recorder::TurnRecorder;

/// Like [`crate::ChatSession`], but each user turn carries an image and is
/// replayed as `[text, image]`.
pub struct VisionSession {
    provider: Arc<dyn ChatProvider>,
    prompt: Arc<dyn PromptSource>,
    settings: ChatSettings,
    assembler: ContextAssembler,
    recorder: TurnRecorder,
    store: ConversationStore,
}

impl VisionSession {
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
            assembler: ContextAssembler::multi_modal(),
            recorder,
            store: ConversationStore::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, stream: impl Into<String>) -> Self {
        self.recorder = self.recorder.with_sink(sink, stream);
        self
    }

    pub async fn start(&self) -> Result<()> {
        self.recorder.setup().await
    }

    pub async fn submit(&mut self, query: &str, image_bytes: &[u8]) -> Result<String> {
        let image = ImagePayload::encode(image_bytes);
        let system_prompt = self.prompt.load()?;
        let messages = self.assembler.assemble(
            &system_prompt,
            self.store.recent(self.settings.history_window),
            query,
            Some(&image),
        );

        let user = Turn::user_with_image(query, image);
        self.recorder.open(&mut self.store, user.clone());

        debug!(
            session = %self.recorder.session_id(),
            messages = messages.len(),
            image_bytes = image_bytes.len(),
            "Vision turn"
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
