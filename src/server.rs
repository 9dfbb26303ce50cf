use actix_cors::Cors;
use actix_web::{
    App, HttpResponse, HttpServer, Responder, get, middleware::Logger, post, web,
};
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::captions::{CaptionSource, YouTubeCaptions};
use crate::config::ServerConfig;
use crate::dto::{
    ChatRequestDto, ChatResponseDto, TranscriptRequest, TranscriptResponse, TranslateMode,
    TranslateRequest,
};
use crate::errors::{ApiError, CaptionError};
use crate::llm::anthropic::Anthropic;
use crate::llm::openai::OpenAI;
use crate::llm::{ChatMessage, ChatProvider, ChatRequest, ModelRouter, Unconfigured};
use crate::pipeline::Translator;

const INDEX_HTML: &str = include_str!("../static/index.html");
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_CHAT_SYSTEM: &str = "한국어로 답변해줘";

/// Upstream clients shared by every request. Built once at startup.
pub struct AppState {
    pub captions: Arc<dyn CaptionSource>,
    pub translator: Translator,
    pub models: ModelRouter,
}

impl AppState {
    pub fn new(
        captions: Arc<dyn CaptionSource>,
        translator: Translator,
        models: ModelRouter,
    ) -> Self {
        Self {
            captions,
            translator,
            models,
        }
    }

    /// Fails when the caption client cannot be created.
    pub fn from_config(config: &ServerConfig) -> Result<Self, CaptionError> {
        let openai: Arc<dyn ChatProvider> = match &config.openai_api_key {
            Some(key) => Arc::new(OpenAI::new(
                key.clone(),
                config.openai_organization.clone(),
                config.openai_base_url.clone(),
                config.translation_model.clone(),
            )),
            None => {
                warn!("OPENAI_API_KEY is not set; translation and GPT chat will fail");
                Arc::new(Unconfigured("OpenAI"))
            }
        };

        let anthropic: Arc<dyn ChatProvider> = match &config.anthropic_api_key {
            Some(key) => Arc::new(Anthropic::new(
                key.clone(),
                config.anthropic_base_url.clone(),
                config.claude_model.clone(),
            )),
            None => {
                warn!("ANTHROPIC_API_KEY is not set; Claude chat will fail");
                Arc::new(Unconfigured("Anthropic"))
            }
        };

        let translator = Translator::new(openai.clone(), config.translation_model.clone())
            .with_alignment(config.alignment);

        let captions = YouTubeCaptions::new(config.caption_langs.clone())?;

        Ok(Self::new(
            Arc::new(captions),
            translator,
            ModelRouter::new(openai, anthropic),
        ))
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Caption translation service is running"
    }))
}

#[post("/transcript")]
pub async fn fetch_transcript(
    data: web::Data<AppState>,
    body: web::Json<TranscriptRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    debug!("Transcript request received: {request:?}");

    let video_id = request
        .video_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            warn!("Transcript request without a video ID");
            ApiError::Validation("Video ID is required".to_string())
        })?;

    let transcripts = data
        .captions
        .fetch(video_id, request.lang.as_deref())
        .await
        .map_err(|e| {
            error!("Error fetching transcript: {e}");
            ApiError::from(e)
        })?;

    info!("Fetched {} caption segments for {video_id}", transcripts.len());
    Ok(HttpResponse::Ok().json(TranscriptResponse { transcripts }))
}

#[post("/translate")]
pub async fn translate(
    data: web::Data<AppState>,
    body: web::Json<TranslateRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    debug!(
        "Translate request received: {} segments, mode={:?}",
        request.transcripts.len(),
        request.mode
    );

    let mode = request
        .mode
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Mode is required".to_string()))?
        .parse::<TranslateMode>()
        .map_err(|e| {
            warn!("Rejected translate request: {e}");
            ApiError::Validation(e)
        })?;

    let result = data
        .translator
        .translate(&request.transcripts, mode)
        .await
        .map_err(|e| {
            error!("Translation error: {e}");
            ApiError::from(e)
        })?;

    info!(
        "Translation completed: {} lines, {} summary characters",
        result.translations.len(),
        result.summary.len()
    );
    Ok(HttpResponse::Ok().json(result))
}

#[post("/chat")]
pub async fn chat(
    data: web::Data<AppState>,
    body: web::Json<ChatRequestDto>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    if request.messages.is_empty() {
        warn!("Chat request without messages");
        return Err(ApiError::Validation(
            "At least one message is required".to_string(),
        ));
    }

    let model = request
        .model
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    let system = request
        .system
        .unwrap_or_else(|| DEFAULT_CHAT_SYSTEM.to_string());
    let provider = data.models.route(&model);
    debug!(
        "Chat request: model={model}, provider={}, {} messages",
        provider.name(),
        request.messages.len()
    );

    let messages = request.messages.into_iter().map(|turn| {
        if turn.is_user {
            ChatMessage::user(turn.text)
        } else {
            ChatMessage::assistant(turn.text)
        }
    });

    let message = provider
        .complete(ChatRequest::new(model).system(system).messages(messages))
        .await
        .map_err(|e| {
            error!("Chat completion failed: {e}");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(ChatResponseDto { message }))
}

fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(fetch_transcript)
        .service(translate)
        .service(chat);
}

/// Registers the page and the JSON endpoints, both at the root and under
/// `/api`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(web::scope("/api").configure(api))
        .configure(api);
}

/// Malformed JSON gets the same `{ "error": ... }` body as other failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024 * 1024) // 16MB
        .error_handler(|err, _req| {
            warn!("Rejected malformed JSON body: {err}");
            ApiError::Validation(format!("Invalid request body: {err}")).into()
        })
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    info!("Starting caption translation service");
    info!(
        "Using configuration: translation_model={}, claude_model={}, caption_langs={:?}, alignment={:?}",
        config.translation_model, config.claude_model, config.caption_langs, config.alignment
    );

    let app_state = match AppState::from_config(&config) {
        Ok(state) => {
            info!("Upstream clients initialized successfully");
            web::Data::new(state)
        }
        Err(e) => {
            error!("Failed to initialize upstream clients: {e}");
            return Err(std::io::Error::other(e));
        }
    };
    let host = config.host.clone();
    let port = config.port;

    info!("Starting HTTP server on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(json_config())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
