//! Data models and structures
//!
//! Defines the request/response bodies of both services, the wire payloads
//! for the hosted chat-completion and image APIs, and the environment-driven
//! service configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Service API bodies

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_url: String,
}

/// Body of `POST /generate`. Everything except the prompt is optional and
/// falls back to the service defaults; an explicitly empty `logo_path` or
/// `phone_number` disables that overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub image_path: String,
    pub image_url: String,
}

// OpenAI API request/response models

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

/// One server-sent event payload of a streamed chat completion.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    pub delta: ChatDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatDelta {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

// Configuration

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub openai_api_key: String,
    pub chat_model: String,
    pub bind_addr: String,
}

impl ChatConfig {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_SECRET_KEY")
                .map_err(|_| crate::Error::Generic("OPENAI_API_SECRET_KEY not set".to_string()))?,
            chat_model: std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            bind_addr: std::env::var("CHAT_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MarketingConfig {
    pub google_api_key: String,
    pub image_model: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub out_dir: PathBuf,
}

impl MarketingConfig {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            google_api_key: std::env::var("GOOGLE_API_KEY")
                .map_err(|_| crate::Error::Generic("GOOGLE_API_KEY not set".to_string()))?,
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash-preview-image-generation".to_string()),
            bind_addr: std::env::var("MARKETING_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            out_dir: PathBuf::from(std::env::var("OUT_DIR").unwrap_or_else(|_| "outputs".to_string())),
        })
    }
}
