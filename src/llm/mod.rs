//! Chat-completion providers.
//!
//! The translator only needs "send a system prompt and some turns, get text
//! back", so every provider is reduced to [`ChatProvider::complete`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::ProviderError;

pub mod anthropic;
pub mod openai;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Provider-neutral completion request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatRequest {
    /// Empty means "use the provider's configured model".
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Run one completion and return the first text the model produced.
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;
}

/// Picks a provider from a model name: `claude*` goes to Anthropic,
/// everything else to OpenAI.
#[derive(Clone)]
pub struct ModelRouter {
    openai: Arc<dyn ChatProvider>,
    anthropic: Arc<dyn ChatProvider>,
}

impl ModelRouter {
    pub fn new(openai: Arc<dyn ChatProvider>, anthropic: Arc<dyn ChatProvider>) -> Self {
        Self { openai, anthropic }
    }

    pub fn route(&self, model: &str) -> &Arc<dyn ChatProvider> {
        if model.starts_with("claude") {
            &self.anthropic
        } else {
            &self.openai
        }
    }
}

/// Stand-in for a provider whose API key was not supplied.
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl ChatProvider for Unconfigured {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn complete(&self, _request: ChatRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "{} API key is not set",
            self.0
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl ChatProvider for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn complete(&self, _request: ChatRequest) -> Result<String, ProviderError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn routes_on_model_prefix() {
        let router = ModelRouter::new(Arc::new(Named("openai")), Arc::new(Named("anthropic")));
        assert_eq!(router.route("claude-3-5-sonnet").name(), "anthropic");
        assert_eq!(router.route("claude").name(), "anthropic");
        assert_eq!(router.route("gpt-4o").name(), "openai");
        assert_eq!(router.route("gpt-4o-mini").name(), "openai");
        assert_eq!(router.route("Claude").name(), "openai");
    }

    #[tokio::test]
    async fn unconfigured_provider_fails() {
        let provider = Unconfigured("Anthropic");
        let err = provider
            .complete(ChatRequest::new("claude").message(ChatMessage::user("hi")))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
