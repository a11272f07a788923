//! `OpenAI` chat completion and image generation

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ImageProvider};
use crate::config::OpenAiConfig;
use crate::conversation::Turn;
use crate::{Error, Result};

/// `OpenAI` API base URL
pub const OPENAI_API_URL: &str = "https://api.openai.com";

/// `OpenAI` client for completions and images
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    image_size: String,
}

impl OpenAiClient {
    /// Create a new `OpenAI` client
    #[must_use]
    pub fn new(client: Client, api_key: SecretString, model: String) -> Self {
        Self {
            client,
            base_url: OPENAI_API_URL.to_string(),
            api_key,
            model,
            image_size: "1024x1024".to_string(),
        }
    }

    /// Build the client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if `OPENAI_API_KEY` is not set
    pub fn from_config(client: Client, config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(client, api_key, config.model.clone()).with_image_size(&config.image_size))
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the generated image size
    #[must_use]
    pub fn with_image_size(mut self, size: &str) -> Self {
        size.clone_into(&mut self.image_size);
        self
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upstream("openai", response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
        };

        let result: ChatCompletionResponse = self
            .post("/v1/chat/completions", &request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Completion(format!("failed to parse response: {e}")))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(Error::MissingField {
                service: "openai",
                field: "choices[0].message.content",
            })?;

        tracing::debug!(model = %self.model, turns = turns.len(), "completion received");
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ImageProvider for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ImageRequest {
            prompt,
            n: 1,
            size: &self.image_size,
        };

        let result: ImageResponse = self
            .post("/v1/images/generations", &request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Image(format!("failed to parse response: {e}")))?;

        result
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(Error::MissingField {
                service: "openai",
                field: "data[0].url",
            })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}
