//! Mock upstreams so the tests never leave the process.

#![allow(dead_code)]

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use yt_summary::captions::CaptionSource;
use yt_summary::dto::CaptionSegment;
use yt_summary::errors::{CaptionError, ProviderError};
use yt_summary::llm::{ChatProvider, ChatRequest, ModelRouter};
use yt_summary::pipeline::{AlignmentPolicy, Translator};
use yt_summary::server::{AppState, json_config, routes};

/// Returns a fixed caption track, or an error for one unlucky video ID.
pub struct MockCaptions {
    pub segments: Vec<CaptionSegment>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

pub const NO_CAPTIONS_ID: &str = "nocaptions";

impl MockCaptions {
    pub fn new(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            segments: sample_segments(texts),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CaptionSource for MockCaptions {
    async fn fetch(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), lang.map(String::from)));
        if video_id == NO_CAPTIONS_ID {
            return Err(CaptionError::Fetch("Transcript is disabled on this video".into()));
        }
        Ok(self.segments.clone())
    }
}

/// Replays canned replies in order and records every request.
pub struct MockProvider {
    pub label: &'static str,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(label: &'static str, replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            label,
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(label: &'static str, replies: &[&str]) -> Arc<Self> {
        Self::new(label, replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::RequestFailed("no scripted reply".into())))
    }
}

pub fn sample_segments(texts: &[&str]) -> Vec<CaptionSegment> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| CaptionSegment::new(*t, i as f64 * 2.5, 2.5))
        .collect()
}

pub struct Harness {
    pub captions: Arc<MockCaptions>,
    pub openai: Arc<MockProvider>,
    pub anthropic: Arc<MockProvider>,
    pub alignment: AlignmentPolicy,
}

impl Harness {
    pub fn new(openai_replies: &[&str]) -> Self {
        Self {
            captions: MockCaptions::new(&["Hello", "world", "today"]),
            openai: MockProvider::replying("openai", openai_replies),
            anthropic: MockProvider::replying("anthropic", &["Claude says hi"]),
            alignment: AlignmentPolicy::Lenient,
        }
    }

    pub fn strict(mut self) -> Self {
        self.alignment = AlignmentPolicy::Strict;
        self
    }

    pub fn state(&self) -> AppState {
        let translator =
            Translator::new(self.openai.clone(), "gpt-4o").with_alignment(self.alignment);
        AppState::new(
            self.captions.clone(),
            translator,
            ModelRouter::new(self.openai.clone(), self.anthropic.clone()),
        )
    }
}

/// Sends one request through the full router.
pub async fn call(harness: &Harness, req: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(harness.state()))
            .app_data(json_config())
            .configure(routes),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}
