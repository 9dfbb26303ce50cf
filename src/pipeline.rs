//! Caption translation and summarization.
//!
//! Text mode translates the whole transcript as one string. Timeline mode
//! sends the segments as a numbered block and maps the numbered reply back
//! onto the segments, one line per segment.

use log::{debug, info, warn};
use regex::Regex;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use crate::dto::{CaptionSegment, TranslateMode, TranslationResult};
use crate::errors::{PipelineError, ProviderError};
use crate::llm::{ChatMessage, ChatProvider, ChatRequest};

const TEXT_PROMPT: &str = "You are a professional translator. Translate the following English text to Korean. Provide only the translation, no explanations.";

const TIMELINE_PROMPT: &str = "You are a professional translator. Translate the following English subtitles to Korean. Keep the line numbers and maintain the same format. Only provide the translations, no explanations.";

const SUMMARY_PROMPT: &str = "You are a professional summarizer. Your task is to provide a summary in Korean with the following requirements:\n\n\
1. Summarize the text into 5 key points\n\
2. Each point should start with a bullet point (•)\n\
3. Write in natural, fluent Korean\n\
4. Keep the original nuance and tone\n\
5. Focus on the main ideas and key messages\n\
6. Make each point a complete sentence\n\
7. Keep it concise and clear";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*(.+)$").expect("numbered line pattern is valid"));

/// What to do when a timeline translation comes back with a different
/// number of lines than there were segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Return the parsed lines as they are and log the mismatch.
    #[default]
    Lenient,
    /// Fail the request.
    Strict,
}

impl FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(AlignmentPolicy::Lenient),
            "strict" => Ok(AlignmentPolicy::Strict),
            other => Err(format!(
                "Unknown alignment policy '{other}', expected 'lenient' or 'strict'"
            )),
        }
    }
}

/// Joins segment texts with single spaces.
pub fn combine_text(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders segments as `1. text\n2. text...`, one line per segment.
///
/// Line breaks inside a cue become spaces.
pub fn number_lines(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s.text.replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits a numbered reply back into lines.
///
/// Blank lines are dropped. A leading `N.` prefix is stripped; a line without
/// one is kept trimmed.
pub fn parse_numbered_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| match NUMBERED_LINE.captures(line) {
            Some(caps) => caps[1].trim().to_string(),
            None => line.trim().to_string(),
        })
        .collect()
}

/// Runs the translation and summary calls against one generation provider.
#[derive(Clone)]
pub struct Translator {
    provider: Arc<dyn ChatProvider>,
    model: String,
    alignment: AlignmentPolicy,
}

impl Translator {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            alignment: AlignmentPolicy::default(),
        }
    }

    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    pub async fn translate(
        &self,
        segments: &[CaptionSegment],
        mode: TranslateMode,
    ) -> Result<TranslationResult, PipelineError> {
        if segments.is_empty() {
            return Err(PipelineError::NoSegments);
        }

        info!(
            "Translating {} segments in {} mode via {}",
            segments.len(),
            mode,
            self.provider.name()
        );

        match mode {
            TranslateMode::Text => self.translate_text(segments).await,
            TranslateMode::Timeline => self.translate_timeline(segments).await,
        }
    }

    async fn translate_text(
        &self,
        segments: &[CaptionSegment],
    ) -> Result<TranslationResult, PipelineError> {
        let combined = combine_text(segments);
        debug!("Text mode: {} characters to translate", combined.len());

        let translation = self
            .ask(TEXT_PROMPT, combined)
            .await
            .map_err(PipelineError::Translation)?;
        let summary = self.summarize(&translation).await?;

        Ok(TranslationResult {
            translations: vec![translation],
            summary,
        })
    }

    async fn translate_timeline(
        &self,
        segments: &[CaptionSegment],
    ) -> Result<TranslationResult, PipelineError> {
        let numbered = number_lines(segments);
        debug!("Timeline mode: {} numbered lines", segments.len());

        let reply = self
            .ask(TIMELINE_PROMPT, numbered)
            .await
            .map_err(PipelineError::Translation)?;

        let translations = parse_numbered_lines(&reply);
        if translations.len() != segments.len() {
            match self.alignment {
                AlignmentPolicy::Strict => {
                    return Err(PipelineError::LineCountMismatch {
                        expected: segments.len(),
                        actual: translations.len(),
                    });
                }
                AlignmentPolicy::Lenient => warn!(
                    "Translation returned {} lines for {} segments; alignment may be off",
                    translations.len(),
                    segments.len()
                ),
            }
        }

        let summary = self.summarize(&translations.join(" ")).await?;

        Ok(TranslationResult {
            translations,
            summary,
        })
    }

    /// Five bullet points in Korean, whatever the mode.
    pub async fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        let summary = self
            .ask(SUMMARY_PROMPT, text.to_string())
            .await
            .map_err(PipelineError::Summary)?;
        if summary.trim().is_empty() {
            return Err(PipelineError::Summary(ProviderError::EmptyResponse));
        }
        Ok(summary)
    }

    async fn ask(&self, system: &str, content: String) -> Result<String, ProviderError> {
        let request = ChatRequest::new(self.model.clone())
            .system(system)
            .message(ChatMessage::user(content));
        self.provider.complete(request).await
    }
}
