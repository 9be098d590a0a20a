//! AI service integration for chat relay and image generation
//!
//! Provides interfaces to OpenAI's chat-completion and image APIs and to
//! Gemini's multimodal generation API, behind traits so handlers can be
//! exercised with mocks.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiImageClient;
pub use mock::{MockChatClient, MockImageGenerationClient, MockImageRelayClient};
pub use openai::{OpenAiChatClient, OpenAiImageClient};

use crate::models::ChatMessage;
use crate::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Incremental reply chunks from a streamed chat completion, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Run a full completion over the conversation and return the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Open a streamed completion over the conversation.
    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChunkStream>;
}

/// Relays an image prompt to a hosted API and returns the hosted image URL.
#[async_trait]
pub trait ImageRelayService: Send + Sync {
    async fn generate_url(&self, prompt: &str) -> Result<String>;
}

/// Generates image bytes from a prompt, with optional system-prompt and
/// model overrides.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<u8>>;
}
