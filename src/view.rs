//! Transcript page state and terminal rendering.
//!
//! A page fetches captions once per URL and then offers two views over the
//! same segments. Each view can be translated at most once: the trigger is
//! locked while a translation is in flight and after one has landed.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::dto::{CaptionSegment, TranslateMode, TranslationResult};
use crate::video_id::extract_video_id;

const INVALID_URL: &str = "올바른 YouTube URL을 입력해주세요.";
const FETCH_FAILED: &str = "자막을 가져오는데 실패했습니다.";
const TRANSLATE_FAILED: &str = "번역에 실패했습니다.";
const TARGET_LANG: &str = "ko";

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// The two upstream calls a page needs.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_transcript(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<CaptionSegment>>;

    async fn translate(
        &self,
        segments: &[CaptionSegment],
        mode: TranslateMode,
    ) -> Result<TranslationResult>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchState {
    Idle,
    Fetching,
    Fetched,
    FetchFailed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum TranslationState {
    Untranslated,
    Translating,
    Translated(TranslationResult),
    TranslateFailed(String),
}

/// Why a transition was refused.
#[derive(Debug, PartialEq)]
pub enum Refusal {
    Busy,
    NotFetched,
    AlreadyTranslated,
    SameLanguage,
    InvalidUrl(String),
}

/// Work handed out by [`TranscriptPage::begin_translate`].
#[derive(Debug)]
pub struct TranslateJob {
    pub mode: TranslateMode,
    pub segments: Vec<CaptionSegment>,
}

#[derive(Debug)]
pub struct TranscriptPage {
    lang: Option<String>,
    fetch: FetchState,
    segments: Vec<CaptionSegment>,
    active: TranslateMode,
    text: TranslationState,
    timeline: TranslationState,
}

impl TranscriptPage {
    pub fn new(lang: Option<String>) -> Self {
        Self {
            lang,
            fetch: FetchState::Idle,
            segments: Vec::new(),
            active: TranslateMode::Text,
            text: TranslationState::Untranslated,
            timeline: TranslationState::Untranslated,
        }
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn segments(&self) -> &[CaptionSegment] {
        &self.segments
    }

    pub fn active_mode(&self) -> TranslateMode {
        self.active
    }

    pub fn state(&self, mode: TranslateMode) -> &TranslationState {
        match mode {
            TranslateMode::Text => &self.text,
            TranslateMode::Timeline => &self.timeline,
        }
    }

    fn state_mut(&mut self, mode: TranslateMode) -> &mut TranslationState {
        match mode {
            TranslateMode::Text => &mut self.text,
            TranslateMode::Timeline => &mut self.timeline,
        }
    }

    /// Captions already in the target language need no translate trigger.
    pub fn is_korean(&self) -> bool {
        self.lang
            .as_deref()
            .is_some_and(|lang| lang.to_ascii_lowercase().starts_with(TARGET_LANG))
    }

    pub fn show(&mut self, mode: TranslateMode) {
        self.active = mode;
    }

    /// Validates the URL and moves to `Fetching`. Returns the video ID to
    /// fetch. An invalid URL never leaves the page.
    pub fn begin_fetch(&mut self, url: &str) -> Result<String, Refusal> {
        if self.fetch == FetchState::Fetching {
            return Err(Refusal::Busy);
        }
        let Some(video_id) = extract_video_id(url) else {
            self.fetch = FetchState::FetchFailed(INVALID_URL.to_string());
            return Err(Refusal::InvalidUrl(INVALID_URL.to_string()));
        };
        self.fetch = FetchState::Fetching;
        Ok(video_id)
    }

    /// A new transcript resets both views.
    pub fn finish_fetch(&mut self, result: Result<Vec<CaptionSegment>>) {
        match result {
            Ok(segments) => {
                debug!("Page received {} segments", segments.len());
                self.segments = segments;
                self.fetch = FetchState::Fetched;
                self.text = TranslationState::Untranslated;
                self.timeline = TranslationState::Untranslated;
            }
            Err(e) => {
                warn!("Transcript fetch failed: {e:#}");
                self.fetch = FetchState::FetchFailed(FETCH_FAILED.to_string());
            }
        }
    }

    pub fn can_translate(&self) -> bool {
        self.check_translate().is_ok()
    }

    fn check_translate(&self) -> Result<(), Refusal> {
        if self.fetch != FetchState::Fetched || self.segments.is_empty() {
            return Err(Refusal::NotFetched);
        }
        if self.is_korean() {
            return Err(Refusal::SameLanguage);
        }
        match self.state(self.active) {
            TranslationState::Translating => Err(Refusal::Busy),
            TranslationState::Translated(_) => Err(Refusal::AlreadyTranslated),
            TranslationState::Untranslated | TranslationState::TranslateFailed(_) => Ok(()),
        }
    }

    /// Locks the active view and hands out the translation to run.
    pub fn begin_translate(&mut self) -> Result<TranslateJob, Refusal> {
        self.check_translate()?;
        let mode = self.active;
        *self.state_mut(mode) = TranslationState::Translating;
        Ok(TranslateJob {
            mode,
            segments: self.segments.clone(),
        })
    }

    pub fn finish_translate(&mut self, mode: TranslateMode, result: Result<TranslationResult>) {
        let state = self.state_mut(mode);
        if *state != TranslationState::Translating {
            warn!("Ignoring {mode} translation result for a view that was not translating");
            return;
        }
        *state = match result {
            Ok(result) => TranslationState::Translated(result),
            Err(e) => {
                warn!("Translation failed: {e:#}");
                TranslationState::TranslateFailed(TRANSLATE_FAILED.to_string())
            }
        };
    }

    pub async fn fetch(&mut self, backend: &dyn Backend, url: &str) -> Result<(), Refusal> {
        let video_id = self.begin_fetch(url)?;
        let result = backend
            .fetch_transcript(&video_id, self.lang.as_deref())
            .await;
        self.finish_fetch(result);
        Ok(())
    }

    /// Translates the active view unless it is locked out. Returns whether a
    /// call was made.
    pub async fn translate(&mut self, backend: &dyn Backend) -> bool {
        let job = match self.begin_translate() {
            Ok(job) => job,
            Err(refusal) => {
                debug!("Translate trigger ignored: {refusal:?}");
                return false;
            }
        };
        let result = backend.translate(&job.segments, job.mode).await;
        self.finish_translate(job.mode, result);
        true
    }

    /// Label of the translate trigger, or `None` when it is hidden.
    pub fn trigger_label(&self) -> Option<&'static str> {
        if self.is_korean() {
            return None;
        }
        Some(match self.state(self.active) {
            TranslationState::Translated(_) => "번역됨",
            TranslationState::Translating => "번역중...",
            _ => "한국어로 번역",
        })
    }

    pub fn error(&self) -> Option<&str> {
        match (&self.fetch, self.state(self.active)) {
            (FetchState::FetchFailed(msg), _) => Some(msg),
            (_, TranslationState::TranslateFailed(msg)) => Some(msg),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        if let Some(error) = self.error() {
            return format!("{error}\n");
        }
        if self.segments.is_empty() {
            return String::new();
        }
        match self.active {
            TranslateMode::Text => self.render_text(),
            TranslateMode::Timeline => self.render_timeline(),
        }
    }

    fn translation(&self, mode: TranslateMode) -> Option<&TranslationResult> {
        match self.state(mode) {
            TranslationState::Translated(result) if !self.is_korean() => Some(result),
            _ => None,
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== 전체 텍스트 ==");
        if let Some(label) = self.trigger_label() {
            let _ = writeln!(out, "[{label}]");
        }

        if let Some(result) = self.translation(TranslateMode::Text) {
            if !result.summary.is_empty() {
                let _ = writeln!(out, "\n-- 주요 내용 요약 --\n{}", decode_html(&result.summary));
            }
            let combined = result
                .translations
                .iter()
                .map(|t| decode_html(t))
                .collect::<Vec<_>>()
                .join(" ");
            if !combined.is_empty() {
                let _ = writeln!(out, "\n-- 한국어 번역 --\n{combined}");
            }
        }

        let heading = if self.is_korean() { "한글 자막" } else { "원문" };
        let original = self
            .segments
            .iter()
            .map(|s| decode_html(&s.text))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "\n-- {heading} --\n{original}");
        out
    }

    fn render_timeline(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== 타임라인 ==");
        if let Some(label) = self.trigger_label() {
            let _ = writeln!(out, "[{label}]");
        }

        let result = self.translation(TranslateMode::Timeline);
        if let Some(result) = result.filter(|r| !r.summary.is_empty()) {
            let _ = writeln!(out, "\n-- 주요 내용 요약 --\n{}", decode_html(&result.summary));
        }

        for (index, segment) in self.segments.iter().enumerate() {
            out.push('\n');
            // Segments past the end of a short translation show none.
            if let Some(line) = result
                .and_then(|r| r.translations.get(index))
                .filter(|line| !line.is_empty())
            {
                let _ = writeln!(out, "{}", decode_html(line));
            }
            let _ = writeln!(out, "{}", decode_html(&segment.text));
            let _ = writeln!(out, "{}", format_span(segment));
        }
        out
    }
}

/// `M분 S초`, floored.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}분 {}초", total / 60, total % 60)
}

pub fn format_span(segment: &CaptionSegment) -> String {
    format!(
        "{} - {}",
        format_timestamp(segment.offset),
        format_timestamp(segment.end())
    )
}

/// Decodes the entities caption tracks come with, including the
/// double-escaped ones.
pub fn decode_html(html: &str) -> String {
    let unescaped = html
        .replace("&amp;#39;", "'")
        .replace("&amp;quot;", "\"")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    ENTITY
        .replace_all(&unescaped, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        _ => return None,
    };
    Some(decoded.to_string())
}
