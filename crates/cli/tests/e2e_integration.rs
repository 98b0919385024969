//! End-to-end tests for ChatDeck sessions.
//!
//! These drive full interactions from user input to stored turns, shipped
//! log records and, for the gateway tests, real HTTP requests against a
//! local one-shot server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chatdeck_core::context::MessageRole;
use chatdeck_core::error::{Error, ProviderError};
use chatdeck_core::image::ImagePayload;
use chatdeck_core::message::Speaker;
use chatdeck_core::prompt::{FilePrompt, InlinePrompt};
use chatdeck_core::provider::{
    ChatProvider, ChatRequest, ChatResponse, ImageProvider, ImageRequest, ImageResponse,
    ResponseHandle,
};
use chatdeck_core::sink::LogSink;
use chatdeck_providers::{OpenAiCompatProvider, OpenAiResponsesProvider};
use chatdeck_session::{ChatSession, ChatSettings, ImageGenSession, VisionSession};
use chatdeck_telemetry::{JsonlSink, MemorySink, TurnLogRecord};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Scripted gateways ────────────────────────────────────────────────────

struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedChat {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedChat exhausted");
        reply.map(|content| ChatResponse {
            content,
            model,
            usage: None,
        })
    }
}

struct ScriptedImages {
    replies: Mutex<VecDeque<Result<&'static [u8], ProviderError>>>,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedImages {
    fn new(replies: Vec<Result<&'static [u8], ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageProvider for ScriptedImages {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        let model = request.model.clone();
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedImages exhausted");
        let handle = ResponseHandle(format!("resp_{n}"));
        reply
            .map_err(|e| match e {
                ProviderError::NoImageGenerated { handle: None } => {
                    ProviderError::NoImageGenerated {
                        handle: Some(handle.clone()),
                    }
                }
                other => other,
            })
            .map(|bytes| ImageResponse {
                image: ImagePayload::encode(bytes),
                handle,
                model,
            })
    }
}

fn records(lines: &[String]) -> Vec<TurnLogRecord> {
    lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ── One-shot HTTP server ─────────────────────────────────────────────────

/// Serve a single request with `status` and `body`; the returned handle
/// yields the raw request (head and body).
async fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<(String, serde_json::Value)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let request_body: serde_json::Value =
            serde_json::from_slice(&buf[header_end..header_end + content_length]).unwrap();

        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        (head, request_body)
    });

    (base_url, handle)
}

// ── E2E: chat ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_hello_hi_with_jsonl_log() {
    let tmp = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonlSink::new(tmp.path(), "chatdeck"));
    let provider = Arc::new(ScriptedChat::new(vec![Ok("hi".into())]));

    let mut session = ChatSession::new(
        provider.clone(),
        Arc::new(InlinePrompt::new("prompts/01_sample.md", "Be friendly.")),
        ChatSettings::new("gpt-4o-mini"),
    )
    .with_sink(sink.clone(), "01_chat");
    session.start().await.unwrap();

    assert_eq!(session.submit("hello").await.unwrap(), "hi");

    let turns = session.store().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "hello");
    assert_eq!(turns[1].text, "hi");

    let content = std::fs::read_to_string(sink.stream_path("01_chat")).unwrap();
    let messages: Vec<String> = content
        .lines()
        .map(|l| {
            let event: serde_json::Value = serde_json::from_str(l).unwrap();
            event["message"].as_str().unwrap().to_string()
        })
        .collect();
    let shipped = records(&messages);
    assert_eq!(shipped.len(), 2);
    assert_eq!(shipped[0].role, "user");
    assert_eq!(shipped[0].content, "hello");
    assert_eq!(shipped[1].role, "assistant");
    assert_eq!(shipped[1].content, "hi");
    assert_eq!(shipped[0].id, session.session_id().0);
    assert_eq!(shipped[0].prompt_path, "prompts/01_sample.md");
}

#[tokio::test]
async fn e2e_failure_on_second_interaction_then_recovery() {
    let provider = Arc::new(ScriptedChat::new(vec![
        Ok("first answer".into()),
        Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        }),
        Ok("third answer".into()),
    ]));
    let sink = Arc::new(MemorySink::new());
    let mut session = ChatSession::new(
        provider.clone(),
        Arc::new(InlinePrompt::new("inline", "sys")),
        ChatSettings::new("m"),
    )
    .with_sink(sink.clone(), "01_chat");
    session.start().await.unwrap();

    session.submit("one").await.unwrap();
    let err = session.submit("two").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::RateLimited { .. })
    ));
    assert_eq!(session.store().len(), 3);
    assert_eq!(session.store().last().unwrap().speaker, Speaker::User);

    // The session keeps going; the unpaired turn is replayed as stored.
    session.submit("three").await.unwrap();
    let last = &provider.requests()[2];
    let roles: Vec<MessageRole> = last.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::User,
        ]
    );

    // Nothing was shipped for the failed interaction.
    let shipped = records(&sink.messages("01_chat").await);
    let contents: Vec<&str> = shipped.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, ["one", "first answer", "two", "third answer"]);
}

#[tokio::test]
async fn e2e_prompt_edits_apply_next_turn() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("prompt.md");
    std::fs::write(&path, "version one").unwrap();

    let provider = Arc::new(ScriptedChat::new(vec![Ok("a".into()), Ok("b".into())]));
    let mut session = ChatSession::new(
        provider.clone(),
        Arc::new(FilePrompt::new(&path)),
        ChatSettings::new("m"),
    );

    session.submit("q1").await.unwrap();
    std::fs::write(&path, "version two").unwrap();
    session.submit("q2").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests[0].messages[0].text_content(), Some("version one"));
    assert_eq!(requests[1].messages[0].text_content(), Some("version two"));
}

#[tokio::test]
async fn e2e_sink_outage_is_fail_closed() {
    let sink = Arc::new(MemorySink::new());
    let mut session = ChatSession::new(
        Arc::new(ScriptedChat::new(vec![Ok("a".into()), Ok("b".into())])),
        Arc::new(InlinePrompt::new("inline", "sys")),
        ChatSettings::new("m"),
    )
    .with_sink(sink.clone(), "01_chat");
    session.start().await.unwrap();

    session.submit("q1").await.unwrap();
    sink.fail_deliveries(true);
    let err = session.submit("q2").await.unwrap_err();
    assert!(matches!(err, Error::Sink(_)));
    assert_eq!(session.store().len(), 3);
}

// ── E2E: vision ──────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_vision_pairs_after_many_questions() {
    let provider = Arc::new(ScriptedChat::new(
        (0..4).map(|i| Ok(format!("answer {i}"))).collect(),
    ));
    let mut session = VisionSession::new(
        provider.clone(),
        Arc::new(InlinePrompt::new("inline", "Describe.")),
        ChatSettings::new("gpt-4o-mini"),
    );

    for i in 0..4 {
        let bytes = format!("image-{i}").into_bytes();
        session.submit(&format!("question {i}"), &bytes).await.unwrap();
    }

    let turns = session.store().turns();
    assert_eq!(turns.len(), 8);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].speaker, Speaker::User);
        assert!(pair[0].image.is_some());
        assert_eq!(pair[1].speaker, Speaker::Assistant);
    }

    let last = provider.requests().pop().unwrap();
    assert_eq!(last.messages.len(), 1 + 6 + 1);
    let images = last.messages.iter().filter(|m| m.has_image()).count();
    assert_eq!(images, 4);
}

// ── E2E: image generation ────────────────────────────────────────────────

#[tokio::test]
async fn e2e_draw_reuses_handle_and_omits_history() {
    let provider = Arc::new(ScriptedImages::new(vec![
        Ok(&b"cat.png"[..]),
        Ok(&b"blue-cat.png"[..]),
        Ok(&b"blue-cat-hat.png"[..]),
    ]));
    let mut session = ImageGenSession::draw(provider.clone(), "gpt-4.1-mini");

    session.submit("draw a cat").await.unwrap();
    session.submit("make it blue").await.unwrap();
    let image = session.submit("add a hat").await.unwrap();
    assert_eq!(image.decode().unwrap(), b"blue-cat-hat.png");

    let requests = provider.requests();
    assert!(requests[0].previous_response.is_none());
    assert_eq!(
        requests[1].previous_response,
        Some(ResponseHandle("resp_1".into()))
    );
    assert_eq!(
        requests[2].previous_response,
        Some(ResponseHandle("resp_2".into()))
    );
    for later in &requests[1..] {
        assert_eq!(later.input.len(), 1);
        assert!(!later.input.iter().any(|m| m.role == MessageRole::System));
    }
    assert_eq!(session.store().len(), 6);
}

#[tokio::test]
async fn e2e_draw_without_image_gives_guidance() {
    let provider = Arc::new(ScriptedImages::new(vec![Err(
        ProviderError::NoImageGenerated { handle: None },
    )]));
    let mut session = ImageGenSession::draw(provider, "gpt-4.1-mini");

    let err = session.submit("hello there").await.unwrap_err();
    assert!(err.to_string().contains("draw a"));
    assert!(session.handle().is_none());
    assert_eq!(session.store().len(), 1);
}

// ── E2E: gateways over HTTP ──────────────────────────────────────────────

#[tokio::test]
async fn e2e_chat_completions_over_http() {
    let (base_url, server) = serve_once(
        200,
        r#"{"id":"c1","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}],"usage":{"prompt_tokens":5,"completion_tokens":1,"total_tokens":6}}"#,
    )
    .await;

    let provider = Arc::new(OpenAiCompatProvider::new("test", base_url, "sk-test"));
    let mut session = ChatSession::new(
        provider,
        Arc::new(InlinePrompt::new("inline", "Be brief.")),
        ChatSettings::new("gpt-4o-mini"),
    );
    assert_eq!(session.submit("hello").await.unwrap(), "hi");

    let (head, body) = server.await.unwrap();
    assert!(head.starts_with("POST /chat/completions"));
    assert!(head.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hello");
}

#[tokio::test]
async fn e2e_unauthorized_maps_to_auth_error() {
    let (base_url, server) = serve_once(401, r#"{"error":{"message":"bad key"}}"#).await;

    let provider = Arc::new(OpenAiCompatProvider::new("test", base_url, "sk-wrong"));
    let mut session = ChatSession::new(
        provider,
        Arc::new(InlinePrompt::new("inline", "sys")),
        ChatSettings::new("m"),
    );
    let err = session.submit("hello").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::AuthenticationFailed(_))
    ));
    assert_eq!(session.store().len(), 1);
    server.await.unwrap();
}

#[tokio::test]
async fn e2e_responses_image_over_http() {
    let (base_url, server) = serve_once(
        200,
        r#"{"id":"resp_http","model":"gpt-4.1-mini","output":[{"type":"image_generation_call","status":"completed","result":"aW1n"}]}"#,
    )
    .await;

    let provider = Arc::new(OpenAiResponsesProvider::new("test", base_url, "sk-test"));
    let mut session = ImageGenSession::edit(
        provider,
        "gpt-4.1-mini",
        Arc::new(InlinePrompt::new("prompts/04_change.md", "Edit it.")),
        b"source",
    );
    let image = session.submit("add a hat").await.unwrap();
    assert_eq!(image.decode().unwrap(), b"img");
    assert_eq!(session.handle(), Some(&ResponseHandle("resp_http".into())));

    let (head, body) = server.await.unwrap();
    assert!(head.starts_with("POST /responses"));
    assert_eq!(body["tools"][0]["type"], "image_generation");
    assert!(body.get("previous_response_id").is_none());
    assert_eq!(body["input"][0]["role"], "system");
    assert_eq!(body["input"][1]["content"][0]["type"], "input_text");
    assert_eq!(body["input"][1]["content"][1]["type"], "input_image");
    assert_eq!(
        body["input"][1]["content"][1]["image_url"],
        ImagePayload::encode(b"source").data_url()
    );
}

#[tokio::test]
async fn e2e_jsonl_sink_trait_object() {
    let tmp = tempfile::tempdir().unwrap();
    let sink: Arc<dyn LogSink> = Arc::new(JsonlSink::new(tmp.path(), "group"));
    sink.setup("stream").await.unwrap();
    sink.setup("stream").await.unwrap();
    sink.send("stream", "payload").await.unwrap();
    assert!(tmp.path().join("group/stream.jsonl").is_file());
}
