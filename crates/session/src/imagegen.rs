//! Image generation and editing over a stateful responses conversation.
//!
//! The first call of a session sends the full input. Every later call sends
//! only the new instruction plus the handle returned by the previous call;
//! the service keeps the earlier turns.

use std::sync::Arc;

use chatdeck_core::error::{ProviderError, Result};
use chatdeck_core::image::ImagePayload;
use chatdeck_core::message::{ConversationStore, SessionId, Turn};
use chatdeck_core::prompt::PromptSource;
use chatdeck_core::provider::{ImageProvider, ImageRequest, ResponseHandle};
use chatdeck_core::sink::LogSink;
use tracing::{debug, info};

use crate::assembler::ContextAssembler;
use crate::recorder::TurnRecorder;

/// What the first call of a session sends.
pub enum ImageGenMode {
    /// Text to image: the bare instruction.
    Draw,
    /// Image to image: system prompt, then the instruction with the source
    /// image attached.
    Edit {
        prompt: Arc<dyn PromptSource>,
        source: ImagePayload,
    },
}

pub struct ImageGenSession {
    provider: Arc<dyn ImageProvider>,
    model: String,
    mode: ImageGenMode,
    recorder: TurnRecorder,
    store: ConversationStore,
    handle: Option<ResponseHandle>,
}

impl ImageGenSession {
    pub fn draw(provider: Arc<dyn ImageProvider>, model: impl Into<String>) -> Self {
        Self::new(provider, model, ImageGenMode::Draw)
    }

    pub fn edit(
        provider: Arc<dyn ImageProvider>,
        model: impl Into<String>,
        prompt: Arc<dyn PromptSource>,
        source_bytes: &[u8],
    ) -> Self {
        let source = ImagePayload::encode(source_bytes);
        Self::new(provider, model, ImageGenMode::Edit { prompt, source })
    }

    pub fn new(
        provider: Arc<dyn ImageProvider>,
        model: impl Into<String>,
        mode: ImageGenMode,
    ) -> Self {
        let prompt_id = match &mode {
            ImageGenMode::Draw => String::new(),
            ImageGenMode::Edit { prompt, .. } => prompt.id().to_string(),
        };
        Self {
            provider,
            model: model.into(),
            mode,
            recorder: TurnRecorder::new(SessionId::new(), prompt_id),
            store: ConversationStore::new(),
            handle: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, stream: impl Into<String>) -> Self {
        self.recorder = self.recorder.with_sink(sink, stream);
        self
    }

    pub async fn start(&self) -> Result<()> {
        self.recorder.setup().await
    }

    fn is_first_call(&self) -> bool {
        self.handle.is_none() || self.store.is_empty()
    }

    /// Run one instruction and return the generated image.
    ///
    /// When the service answers without an image the error is
    /// [`ProviderError::NoImageGenerated`] and only the user turn is appended.
    /// On a continuation the handle moves to that answer, so the next
    /// instruction follows up on it.
    pub async fn submit(&mut self, query: &str) -> Result<ImagePayload> {
        let first = self.is_first_call();
        let (input, user) = if first {
            match &self.mode {
                ImageGenMode::Draw => {
                    (ContextAssembler::first_generation(query), Turn::user(query))
                }
                ImageGenMode::Edit { prompt, source } => {
                    let system_prompt = prompt.load()?;
                    let input = ContextAssembler::multi_modal().assemble(
                        &system_prompt,
                        &[],
                        query,
                        Some(source),
                    );
                    (input, Turn::user_with_image(query, source.clone()))
                }
            }
        } else {
            (ContextAssembler::continuation(query), Turn::user(query))
        };
        let previous_response = if first { None } else { self.handle.clone() };

        self.recorder.open(&mut self.store, user.clone());

        debug!(
            session = %self.recorder.session_id(),
            continuation = previous_response.is_some(),
            "Image turn"
        );
        let request = ImageRequest {
            model: self.model.clone(),
            input,
            previous_response,
        };
        let response = match self.provider.generate_image(request).await {
            Ok(response) => response,
            Err(ProviderError::NoImageGenerated { handle }) => {
                info!(session = %self.recorder.session_id(), "No image in response");
                if !first && handle.is_some() {
                    self.handle = handle.clone();
                }
                return Err(ProviderError::NoImageGenerated { handle }.into());
            }
            Err(e) => return Err(e.into()),
        };

        self.recorder
            .close(
                &mut self.store,
                &user,
                Turn::assistant_image(response.image.clone()),
            )
            .await?;
        self.handle = Some(response.handle);
        Ok(response.image)
    }

    pub fn handle(&self) -> Option<&ResponseHandle> {
        self.handle.as_ref()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn session_id(&self) -> &SessionId {
        self.recorder.session_id()
    }
}
