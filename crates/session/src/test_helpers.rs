//! Scripted gateways shared by the session tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chatdeck_core::error::ProviderError;
use chatdeck_core::image::ImagePayload;
use chatdeck_core::provider::{
    ChatProvider, ChatRequest, ChatResponse, ImageProvider, ImageRequest, ImageResponse,
    ResponseHandle,
};

/// Returns scripted results in order and keeps every request it saw.
pub struct ScriptedChatProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedChatProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedChatProvider: no more replies");
        reply.map(|content| ChatResponse {
            content,
            model,
            usage: None,
        })
    }
}

/// Image gateway that hands out `resp_1`, `resp_2`, ... as handles.
pub struct ScriptedImageProvider {
    replies: Mutex<VecDeque<Result<Vec<u8>, ProviderError>>>,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedImageProvider {
    pub fn new(replies: Vec<Result<Vec<u8>, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageProvider for ScriptedImageProvider {
    fn name(&self) -> &str {
        "scripted"
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
            .expect("ScriptedImageProvider: no more replies");
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
                image: ImagePayload::encode(&bytes),
                handle,
                model,
            })
    }
}
