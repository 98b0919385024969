//! Turn recording: append turns to the store and ship them to a log sink.
//!
//! An interaction is split around the gateway call:
//!
//! 1. [`TurnRecorder::open`] appends the user turn.
//! 2. The gateway is called.
//! 3. [`TurnRecorder::close`] ships the user record, then the assistant
//!    record, then appends the assistant turn.
//!
//! A gateway failure between 1 and 3 leaves the user turn unpaired. A sink
//! failure in 3 does the same: the assistant turn is only appended once both
//! records were delivered.

use std::sync::Arc;

use chatdeck_core::error::Result;
use chatdeck_core::message::{ConversationStore, SessionId, Turn};
use chatdeck_core::sink::LogSink;
use chatdeck_telemetry::TurnLogRecord;
use tracing::debug;

struct SinkTarget {
    sink: Arc<dyn LogSink>,
    stream: String,
}

pub struct TurnRecorder {
    session: SessionId,
    prompt_id: String,
    target: Option<SinkTarget>,
}

impl TurnRecorder {
    /// A recorder that only appends to the store.
    pub fn new(session: SessionId, prompt_id: impl Into<String>) -> Self {
        Self {
            session,
            prompt_id: prompt_id.into(),
            target: None,
        }
    }

    /// Ship every recorded turn to `stream` on `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, stream: impl Into<String>) -> Self {
        self.target = Some(SinkTarget {
            sink,
            stream: stream.into(),
        });
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    pub fn logging_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Make sure the log stream exists. Safe to call more than once.
    pub async fn setup(&self) -> Result<()> {
        if let Some(target) = &self.target {
            target.sink.setup(&target.stream).await?;
            debug!(sink = target.sink.name(), stream = %target.stream, "Turn logging enabled");
        }
        Ok(())
    }

    pub fn open(&self, store: &mut ConversationStore, user: Turn) {
        store.push(user);
    }

    pub async fn close(
        &self,
        store: &mut ConversationStore,
        user: &Turn,
        assistant: Turn,
    ) -> Result<()> {
        if let Some(target) = &self.target {
            self.ship(target, user).await?;
            self.ship(target, &assistant).await?;
        }
        store.push(assistant);
        Ok(())
    }

    /// Append a complete exchange.
    pub async fn record(
        &self,
        store: &mut ConversationStore,
        user: Turn,
        assistant: Turn,
    ) -> Result<()> {
        self.open(store, user.clone());
        self.close(store, &user, assistant).await
    }

    async fn ship(&self, target: &SinkTarget, turn: &Turn) -> Result<()> {
        let record = TurnLogRecord::from_turn(&self.session, &self.prompt_id, turn);
        let message = record.to_json()?;
        target.sink.send(&target.stream, &message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdeck_core::error::Error;
    use chatdeck_core::image::ImagePayload;
    use chatdeck_core::message::Speaker;
    use chatdeck_telemetry::MemorySink;

    fn recorder_with(sink: Arc<MemorySink>) -> TurnRecorder {
        TurnRecorder::new(SessionId::from("sess-1"), "prompts/01_sample.md")
            .with_sink(sink, "01_chat")
    }

    #[tokio::test]
    async fn record_without_sink_appends_pair() {
        let recorder = TurnRecorder::new(SessionId::new(), "p");
        let mut store = ConversationStore::new();
        recorder
            .record(&mut store, Turn::user("hello"), Turn::assistant("hi"))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.turns()[0].speaker, Speaker::User);
        assert_eq!(store.turns()[1].speaker, Speaker::Assistant);
        assert!(!recorder.logging_enabled());
    }

    #[tokio::test]
    async fn record_ships_user_then_assistant() {
        let sink = Arc::new(MemorySink::new());
        let recorder = recorder_with(sink.clone());
        recorder.setup().await.unwrap();

        let mut store = ConversationStore::new();
        recorder
            .record(&mut store, Turn::user("hello"), Turn::assistant("hi"))
            .await
            .unwrap();

        let messages = sink.messages("01_chat").await;
        assert_eq!(messages.len(), 2);
        let user: TurnLogRecord = serde_json_from(&messages[0]);
        let assistant: TurnLogRecord = serde_json_from(&messages[1]);
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "hello");
        assert_eq!(user.id, "sess-1");
        assert_eq!(user.prompt_path, "prompts/01_sample.md");
        assert_eq!(assistant.role, "assistant");
        assert_eq!(assistant.content, "hi");
    }

    #[tokio::test]
    async fn open_appends_before_close() {
        let recorder = TurnRecorder::new(SessionId::new(), "p");
        let mut store = ConversationStore::new();
        let user = Turn::user("q");
        recorder.open(&mut store, user.clone());
        assert_eq!(store.len(), 1);
        recorder
            .close(&mut store, &user, Turn::assistant("a"))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn sink_failure_keeps_assistant_turn_out() {
        let sink = Arc::new(MemorySink::new());
        let recorder = recorder_with(sink.clone());
        recorder.setup().await.unwrap();
        sink.fail_deliveries(true);

        let mut store = ConversationStore::new();
        let err = recorder
            .record(&mut store, Turn::user("hello"), Turn::assistant("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Sink(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.last().unwrap().speaker, Speaker::User);
    }

    #[tokio::test]
    async fn image_records_carry_reference_only() {
        let sink = Arc::new(MemorySink::new());
        let recorder = recorder_with(sink.clone());
        recorder.setup().await.unwrap();

        let image = ImagePayload::encode(&[1u8; 64]);
        let mut store = ConversationStore::new();
        recorder
            .record(
                &mut store,
                Turn::user("draw"),
                Turn::assistant_image(image.clone()),
            )
            .await
            .unwrap();

        let messages = sink.messages("01_chat").await;
        assert!(!messages[1].contains(image.as_base64()));
        let record: TurnLogRecord = serde_json_from(&messages[1]);
        assert_eq!(record.image, Some(image.reference()));
        assert!(record.content.is_empty());
    }

    fn serde_json_from(raw: &str) -> TurnLogRecord {
        serde_json::from_str(raw).unwrap()
    }
}
