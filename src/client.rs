use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::dto::{
    CaptionSegment, ChatRequestDto, ChatResponseDto, ChatTurn, ErrorResponse, TranscriptRequest,
    TranscriptResponse, TranslateMode, TranslateRequest, TranslationResult,
};
use crate::view::{Backend, FetchState, Refusal, TranscriptPage};

/// Talks to a running `yt-summary serve` instance.
pub struct ApiClient {
    client: reqwest::Client,
    server_url: String,
}

impl ApiClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_url: server_url.into(),
        }
    }

    pub async fn check_health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/health", self.server_url))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to connect to server: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("Server health check failed: {}", response.status()))
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/api/{}", self.server_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response: {}", e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&response_text)
                .map(|e| e.error)
                .unwrap_or(response_text);
            return Err(anyhow!("Server returned error {}: {}", status, message));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))
    }

    pub async fn chat(
        &self,
        messages: Vec<ChatTurn>,
        model: Option<String>,
        system: Option<String>,
    ) -> Result<String> {
        let response: ChatResponseDto = self
            .post(
                "chat",
                &ChatRequestDto {
                    messages,
                    model,
                    system,
                },
            )
            .await?;
        Ok(response.message)
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn fetch_transcript(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<CaptionSegment>> {
        let response: TranscriptResponse = self
            .post(
                "transcript",
                &TranscriptRequest {
                    video_id: Some(video_id.to_string()),
                    lang: lang.map(String::from),
                },
            )
            .await?;
        Ok(response.transcripts)
    }

    async fn translate(
        &self,
        segments: &[CaptionSegment],
        mode: TranslateMode,
    ) -> Result<TranslationResult> {
        self.post(
            "translate",
            &TranslateRequest {
                transcripts: segments.to_vec(),
                mode: Some(mode.to_string()),
            },
        )
        .await
    }
}

async fn connect(config: &ClientConfig) -> Result<ApiClient> {
    let api = ApiClient::new(config.server_url.clone());
    println!("🔍 Checking server health at: {}/api/health", config.server_url);
    if let Err(e) = api.check_health().await {
        eprintln!("❌ {e}");
        eprintln!("💡 Make sure the server is running: yt-summary serve");
        return Err(e);
    }
    Ok(api)
}

async fn load_page(api: &ApiClient, config: &ClientConfig, url: &str) -> Result<TranscriptPage> {
    let mut page = TranscriptPage::new(config.lang.clone());
    println!("📥 Fetching captions for: {url}");

    if let Err(Refusal::InvalidUrl(message)) = page.fetch(api, url).await {
        return Err(anyhow!(message));
    }
    if let FetchState::FetchFailed(message) = page.fetch_state() {
        return Err(anyhow!(message.clone()));
    }

    println!("✅ {} caption segments", page.segments().len());
    Ok(page)
}

pub async fn run_transcript(config: ClientConfig, url: String, mode: TranslateMode) -> Result<()> {
    let api = connect(&config).await?;
    let mut page = load_page(&api, &config, &url).await?;
    page.show(mode);
    println!("\n{}", page.render());
    Ok(())
}

pub async fn run_translate(config: ClientConfig, url: String, mode: TranslateMode) -> Result<()> {
    let api = connect(&config).await?;
    let mut page = load_page(&api, &config, &url).await?;
    page.show(mode);

    if page.is_korean() {
        println!("ℹ️  Captions are already in Korean; skipping translation");
    } else {
        println!("🚀 Translating in {mode} mode...");
        page.translate(&api).await;
        if let Some(error) = page.error() {
            eprintln!("❌ {error}");
            return Err(anyhow!(error.to_string()));
        }
    }

    println!("\n{}", page.render());
    Ok(())
}

pub async fn run_chat(
    config: ClientConfig,
    prompt: String,
    model: Option<String>,
    system: Option<String>,
) -> Result<()> {
    let api = connect(&config).await?;
    let turns = vec![ChatTurn {
        text: prompt,
        is_user: true,
    }];

    match api.chat(turns, model, system).await {
        Ok(reply) => {
            println!("\n{reply}");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Chat failed: {e}");
            Err(e)
        }
    }
}
