use async_trait::async_trait;
use log::{debug, error};
use yt_transcript_rs::api::YouTubeTranscriptApi;

use crate::dto::CaptionSegment;
use crate::errors::CaptionError;

/// A source of caption tracks keyed by video ID.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track for `video_id`, preferring `lang` when given.
    async fn fetch(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<CaptionSegment>, CaptionError>;
}

/// Caption source backed by YouTube's timed-text endpoints.
pub struct YouTubeCaptions {
    api: YouTubeTranscriptApi,
    default_langs: Vec<String>,
}

impl YouTubeCaptions {
    pub fn new(default_langs: Vec<String>) -> Result<Self, CaptionError> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| CaptionError::Client(e.to_string()))?;
        Ok(Self { api, default_langs })
    }
}

/// The request's language hint when it has one, otherwise the configured list.
fn languages<'a>(defaults: &'a [String], lang: Option<&'a str>) -> Vec<&'a str> {
    match lang {
        Some(lang) if !lang.trim().is_empty() => vec![lang.trim()],
        _ => defaults.iter().map(String::as_str).collect(),
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptions {
    async fn fetch(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        let languages = languages(&self.default_langs, lang);
        debug!("Fetching captions for {video_id} with languages {languages:?}");

        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| {
                error!("Failed to fetch transcript for {video_id}: {e}");
                CaptionError::Fetch(e.to_string())
            })?;

        let segments: Vec<CaptionSegment> = transcript
            .snippets
            .into_iter()
            .map(|snippet| CaptionSegment::new(snippet.text, snippet.start, snippet.duration))
            .collect();

        if segments.is_empty() {
            return Err(CaptionError::Empty(video_id.to_string()));
        }

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_lang_overrides_defaults() {
        let defaults = vec!["en".to_string(), "en-US".to_string()];
        assert_eq!(languages(&defaults, Some("ko")), vec!["ko"]);
        assert_eq!(languages(&defaults, None), vec!["en", "en-US"]);
        assert_eq!(languages(&defaults, Some("  ")), vec!["en", "en-US"]);
    }

    #[test]
    fn client_is_created_with_the_source() {
        let captions = YouTubeCaptions::new(vec!["en".into()]).unwrap();
        assert_eq!(captions.default_langs, vec!["en"]);
    }
}
