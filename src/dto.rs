use serde::{Deserialize, Serialize};

/// One caption cue as returned by the captioning provider.
///
/// `offset` and `duration` are in seconds. Segments keep the order the
/// provider returned them in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

impl CaptionSegment {
    pub fn new(text: impl Into<String>, offset: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            offset,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslateMode {
    Text,
    Timeline,
}

impl std::fmt::Display for TranslateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateMode::Text => write!(f, "text"),
            TranslateMode::Timeline => write!(f, "timeline"),
        }
    }
}

impl std::str::FromStr for TranslateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TranslateMode::Text),
            "timeline" => Ok(TranslateMode::Timeline),
            other => Err(format!("Unknown mode '{other}', expected 'text' or 'timeline'")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translations: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcripts: Vec<CaptionSegment>,
}

/// `mode` stays a raw string so an unknown value is rejected with the same
/// `{ "error": ... }` body as every other validation failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub transcripts: Vec<CaptionSegment>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub text: String,
    pub is_user: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequestDto {
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponseDto {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
