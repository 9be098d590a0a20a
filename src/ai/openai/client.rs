use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiHttpClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let response = self.send(path, request, Some(self.timeout)).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse OpenAI response: {}", e))
        })
    }

    /// POST and return the raw response for incremental body consumption.
    ///
    /// No timeout: a streamed completion is open-ended and upstream pacing
    /// passes through to the caller.
    pub async fn post_stream<Req: Serialize>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<reqwest::Response> {
        self.send(path, request, None).await
    }

    async fn send<Req: Serialize>(
        &self,
        path: &str,
        request: &Req,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to OpenAI: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("OpenAI API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Incremental decoder for the `text/event-stream` body of a streamed chat
/// completion. Events are separated by a blank line; each `data:` line is one
/// payload, and `[DONE]` terminates the stream.
pub(crate) struct SseBuffer {
    buf: String,
    done: bool,
}

impl SseBuffer {
    pub(crate) fn new() -> Self {
        Self {
            buf: String::new(),
            done: false,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn finish(&mut self) {
        self.done = true;
    }

    /// Feed raw body bytes, returning any complete `data:` payloads.
    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) -> VecDeque<String> {
        let mut payloads = VecDeque::new();
        if self.done {
            return payloads;
        }

        self.buf.push_str(&String::from_utf8_lossy(bytes));

        while let Some(pos) = self.buf.find("\n\n") {
            let event: String = self.buf.drain(..pos + 2).collect();
            for line in event.lines() {
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data == "[DONE]" {
                    self.done = true;
                    return payloads;
                }
                payloads.push_back(data.to_string());
            }
        }

        payloads
    }
}
