use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatProvider, ChatRequest};
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API.
///
/// Chat requests always run against the configured model; the requested
/// model name only decides that a request lands here.
pub struct Anthropic {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    pub fn from_chat(request: ChatRequest, model: &str, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: request
                .messages
                .into_iter()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content,
                })
                .collect(),
            system: request.system,
            max_tokens,
        }
    }
}

impl Anthropic {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: model.into(),
            max_tokens: 8192,
        }
    }

    /// Text of the first content block, if it is a text block.
    pub fn extract_text(response: &AnthropicResponse) -> Option<String> {
        response
            .content
            .first()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.clone())
    }

    async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({status}): {message}");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ChatProvider for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let request = AnthropicRequest::from_chat(request, &self.model, self.max_tokens);
        debug!(
            "Anthropic completion: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self.send(&request).await?;
        Self::extract_text(&response).ok_or(ProviderError::EmptyResponse)
    }
}
