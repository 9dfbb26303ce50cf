use crate::pipeline::AlignmentPolicy;

pub const DEFAULT_TRANSLATION_MODEL: &str = "gpt-4o";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_organization: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub translation_model: String,
    pub claude_model: String,
    pub caption_langs: Vec<String>,
    pub alignment: AlignmentPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            openai_api_key: None,
            openai_organization: None,
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_base_url: None,
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
            caption_langs: vec!["en".to_string()],
            alignment: AlignmentPolicy::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub server_url: String,
    pub lang: Option<String>,
}

impl ClientConfig {
    pub fn new(server_url: String, lang: Option<String>) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            lang,
        }
    }
}

/// Splits a comma-separated language list, dropping empty entries.
pub fn parse_langs(s: &str) -> Vec<String> {
    s.split(',')
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect()
}
