//! Error types shared by the caption source, the generation providers, the
//! translation pipeline and the HTTP layer.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::dto::ErrorResponse;

/// Errors from a text-generation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API responded with error: {status_code} - {message}")]
    ApiError { status_code: u16, message: String },

    /// The provider was never configured (missing API key).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

/// Errors from the captioning provider.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Caption request failed: {0}")]
    Fetch(String),

    #[error("No captions available for video {0}")]
    Empty(String),

    #[error("Failed to create caption client: {0}")]
    Client(String),
}

/// Errors from the translation pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No caption segments to translate")]
    NoSegments,

    #[error("Translation failed: {0}")]
    Translation(#[source] ProviderError),

    #[error("Summarization failed: {0}")]
    Summary(#[source] ProviderError),

    #[error("Translation returned {actual} lines for {expected} segments")]
    LineCountMismatch { expected: usize, actual: usize },
}

/// Errors surfaced over HTTP. The body is always `{ "error": "<message>" }`
/// and the message is intentionally flat: upstream detail stays in the logs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to fetch transcript")]
    Fetch(#[from] CaptionError),

    #[error("Failed to translate text")]
    Translate(#[source] PipelineError),

    #[error("Translation is out of alignment with the transcript")]
    Alignment(#[source] PipelineError),

    #[error("Failed to generate reply")]
    Chat(#[from] ProviderError),
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::NoSegments => ApiError::Validation(error.to_string()),
            PipelineError::LineCountMismatch { .. } => ApiError::Alignment(error),
            _ => ApiError::Translate(error),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Alignment(_) => StatusCode::BAD_GATEWAY,
            ApiError::Fetch(_) | ApiError::Translate(_) | ApiError::Chat(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_statuses() {
        let err: ApiError = PipelineError::NoSegments.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = PipelineError::LineCountMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError = PipelineError::Translation(ProviderError::EmptyResponse).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to translate text");
    }

    #[test]
    fn caption_errors_collapse_to_one_message() {
        let a: ApiError = CaptionError::Fetch("network down".into()).into();
        let b: ApiError = CaptionError::Empty("abc".into()).into();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
