use super::client::OpenAiHttpClient;
use crate::ai::ImageRelayService;
use crate::models::{ImageGenerationRequest, ImageGenerationResponse};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const GENERATIONS_PATH: &str = "/v1/images/generations";
const IMAGE_SIZE: &str = "256x256";

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
}

impl OpenAiImageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, Duration::from_secs(60)),
        }
    }

    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(60), client),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageRelayService for OpenAiImageClient {
    async fn generate_url(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Sending image generation request to OpenAI");

        let request = ImageGenerationRequest {
            prompt: prompts::render(prompts::IMAGE_RELAY, &[("prompt", prompt)]),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        let response: ImageGenerationResponse = self.http.post(GENERATIONS_PATH, &request).await?;

        response
            .data
            .first()
            .and_then(|data| data.url.clone())
            .ok_or_else(|| Error::AiProvider("No image URL in OpenAI response".to_string()))
    }
}
