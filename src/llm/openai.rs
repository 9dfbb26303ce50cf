use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatProvider, ChatRequest};
use crate::errors::ProviderError;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Client for the OpenAI chat completions API.
pub struct OpenAI {
    client: Client,
    api_key: String,
    organization: Option<String>,
    endpoint: String,
    default_model: String,
}

#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

impl OpenAIRequest {
    /// The system prompt travels as the first message.
    pub fn from_chat(request: ChatRequest, default_model: &str) -> Self {
        let model = if request.model.is_empty() {
            default_model.to_string()
        } else {
            request.model
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system),
            });
        }
        messages.extend(request.messages.into_iter().map(|m| OpenAIMessage {
            role: m.role.as_str().to_string(),
            content: Some(m.content),
        }));

        Self { model, messages }
    }
}

impl OpenAI {
    pub fn new(
        api_key: impl Into<String>,
        organization: Option<String>,
        endpoint: Option<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            organization,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            default_model: default_model.into(),
        }
    }

    pub fn extract_text(response: &OpenAIResponse) -> Option<String> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
    }

    async fn send(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'));

        let mut builder = self.client.post(&url).bearer_auth(&self.api_key).json(request);
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({status}): {message}");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let request = OpenAIRequest::from_chat(request, &self.default_model);
        debug!(
            "OpenAI completion: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self.send(&request).await?;
        // A null content is treated as an empty reply, not a failure.
        Ok(Self::extract_text(&response).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn system_prompt_becomes_first_message() {
        let chat = ChatRequest::new("")
            .system("be brief")
            .message(ChatMessage::user("hello"))
            .message(ChatMessage::assistant("hi"));
        let request = OpenAIRequest::from_chat(chat, "gpt-4o");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be brief");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][2]["role"], "assistant");
    }

    #[test]
    fn explicit_model_wins() {
        let request = OpenAIRequest::from_chat(ChatRequest::new("gpt-4o-mini"), "gpt-4o");
        assert_eq!(request.model, "gpt-4o-mini");
    }

    #[test]
    fn extract_text_takes_first_choice() {
        let response: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"안녕"}},
                           {"message":{"role":"assistant","content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAI::extract_text(&response).as_deref(), Some("안녕"));

        let response: OpenAIResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert_eq!(OpenAI::extract_text(&response), None);
    }
}
