use super::client::{OpenAiHttpClient, SseBuffer};
use crate::ai::{ChatService, ChunkStream};
use crate::models::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::time::Duration;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const CHAT_TEMPERATURE: f32 = 0.6;

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, Duration::from_secs(30)),
            model,
        }
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(30), client),
            model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn request(&self, messages: &[ChatMessage], stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: CHAT_TEMPERATURE,
            stream: stream.then_some(true),
        }
    }
}

/// Pull the next reply fragment out of a decoded SSE payload, if it has one.
fn delta_content(payload: &str) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(payload).map_err(|e| {
        tracing::error!("Failed to parse OpenAI stream chunk: {}\nBody: {}", e, payload);
        Error::AiProvider(format!("Failed to parse OpenAI stream chunk: {}", e))
    })?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content))
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!("Sending chat completion request to OpenAI");

        let request = self.request(messages, false);
        let response: crate::models::ChatCompletionResponse =
            self.http.post(COMPLETIONS_PATH, &request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| Error::AiProvider("No response from OpenAI chat API".to_string()))
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChunkStream> {
        tracing::debug!("Opening streamed chat completion to OpenAI");

        let request = self.request(messages, true);
        let response = self.http.post_stream(COMPLETIONS_PATH, &request).await?;
        let body = response.bytes_stream().boxed();

        let state: (_, _, VecDeque<String>) = (body, SseBuffer::new(), VecDeque::new());
        let stream = futures::stream::unfold(state, |(mut body, mut sse, mut pending)| async move {
            loop {
                while let Some(payload) = pending.pop_front() {
                    match delta_content(&payload) {
                        Ok(Some(content)) => return Some((Ok(content), (body, sse, pending))),
                        // Role-only and finish chunks carry no text.
                        Ok(None) => continue,
                        Err(e) => {
                            pending.clear();
                            sse.finish();
                            return Some((Err(e), (body, sse, pending)));
                        }
                    }
                }

                if sse.is_done() {
                    return None;
                }

                match body.next().await {
                    Some(Ok(bytes)) => pending = sse.push_bytes(&bytes),
                    Some(Err(e)) => {
                        sse.finish();
                        return Some((Err(e.into()), (body, sse, pending)));
                    }
                    None => return None,
                }
            }
        });

        Ok(stream.boxed())
    }
}
