//! Boundary to the external text-generation provider.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// What a provider handed back for a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedText {
    /// The provider honoured the requested `{"report": ...}` shape
    Structured { report: String },
    /// Free-form text, possibly a wrapper around a JSON fragment
    Text(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request outlived the budget set by the caller
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),

    /// The HTTP client gave up waiting on the provider
    #[error("text generation request timed out in transport: {0}")]
    TransportTimeout(#[source] reqwest::Error),

    #[error("text generation request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("text generation provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    /// Nothing to build a report from, remotely or locally
    #[error("no activities to build a report from")]
    EmptyReport,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::TransportTimeout(err)
        } else {
            GenerationError::Http(err)
        }
    }
}

impl GenerationError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GenerationError::Timeout(_) | GenerationError::TransportTimeout(_)
        )
    }
}

/// A text-generation backend.
///
/// Implementations should ask the provider for a JSON object with a single
/// string field `report`, and fall back to [`GeneratedText::Text`] when the
/// response does not have that shape.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerationError>;
}
