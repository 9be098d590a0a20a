use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

#[derive(Debug, Serialize)]
struct GenerateImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
    default_model: String,
}

impl GeminiImageClient {
    pub fn new(api_key: String, default_model: String) -> Self {
        Self::new_with_client(api_key, default_model, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        default_model: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, Duration::from_secs(120), client),
            default_model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        model: Option<&str>,
    ) -> Result<Vec<u8>> {
        // Image models reject a system role, so any system prompt rides in
        // the single user turn.
        let combined = match system_prompt {
            Some(system) => format!("{}\n\nUser request: {}", system, prompt),
            None => prompt.to_string(),
        };

        let request = GenerateImageRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text { text: combined }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        };

        let model = model.unwrap_or(&self.default_model);
        let response: GenerateContentResponse =
            self.http.generate_content(model, &request).await?;

        let image_data = response
            .candidates
            .first()
            .and_then(|candidate| {
                candidate.content.parts.iter().find_map(|part| match part {
                    Part::InlineData { inline_data } => Some(inline_data),
                    _ => None,
                })
            })
            .ok_or_else(|| Error::AiProvider("No image data in Gemini response".to_string()))?;

        tracing::debug!(
            "Gemini returned image with mime_type: {}",
            image_data.mime_type
        );

        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(&image_data.data)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Gemini base64 image: {}", e)))
    }
}
