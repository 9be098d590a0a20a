use super::{ChatService, ChunkStream, ImageGenerationService, ImageRelayService};
use crate::models::ChatMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex};

fn take_cycled<T: Clone>(responses: &Mutex<Vec<T>>, call: usize) -> Option<T> {
    let responses = responses.lock().unwrap();
    if responses.is_empty() {
        None
    } else {
        Some(responses[(call - 1) % responses.len()].clone())
    }
}

pub struct MockChatClient {
    replies: Arc<Mutex<Vec<String>>>,
    stream_scripts: Arc<Mutex<Vec<Vec<String>>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            stream_scripts: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_reply(self, reply: String) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_stream_chunks(self, chunks: Vec<String>) -> Self {
        self.stream_scripts.lock().unwrap().push(chunks);
        self
    }

    /// Make every call fail with an upstream error.
    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn bump(&self) -> Result<usize> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        Ok(*count)
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let call = self.bump()?;
        Ok(take_cycled(&self.replies, call).unwrap_or_else(|| {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("Mock reply to: {}", last)
        }))
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChunkStream> {
        let call = self.bump()?;
        let chunks = match take_cycled(&self.stream_scripts, call) {
            Some(chunks) => chunks,
            None => {
                let reply = take_cycled(&self.replies, call).unwrap_or_else(|| {
                    let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                    format!("Mock reply to: {}", last)
                });
                vec![reply]
            }
        };

        Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

pub struct MockImageRelayClient {
    urls: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageRelayClient {
    pub fn new() -> Self {
        Self {
            urls: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_url(self, url: String) -> Self {
        self.urls.lock().unwrap().push(url);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageRelayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageRelayService for MockImageRelayClient {
    async fn generate_url(&self, _prompt: &str) -> Result<String> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        Ok(take_cycled(&self.urls, *count)
            .unwrap_or_else(|| "https://images.example.com/mock.png".to_string()))
    }
}

pub struct MockImageGenerationClient {
    images: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, image: Vec<u8>) -> Self {
        self.images.lock().unwrap().push(image);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _model: Option<&str>,
    ) -> Result<Vec<u8>> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        Ok(take_cycled(&self.images, *count).unwrap_or_else(|| {
            // A valid 1x1 PNG so downstream decoding succeeds.
            vec![
                0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
                0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
                0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
                0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
                0x44, 0x41, // IDAT chunk
                0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00, 0x9C,
                0xE3, 0xBF, 0x59, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
                0x44, 0xAE, 0x42, 0x60, 0x82,
            ]
        }))
    }
}
