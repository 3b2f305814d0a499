//! Error taxonomy for the translation pipeline.
//!
//! Only [`TranslateError`] crosses the public boundary of
//! [`Translator::translate`](crate::Translator::translate). Strategy failures
//! ([`StrategyError`]) are logged and swallowed until the last strategy fails.

use reqwest::StatusCode;
use thiserror::Error;

/// Terminal failure of a translate call.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Text is required")]
    EmptyText,

    #[error("The language '{0}' is not supported")]
    UnsupportedLanguage(String),

    #[error("All {attempts} translation strategies failed, last error: {source}")]
    AllStrategiesFailed {
        attempts: usize,
        #[source]
        source: StrategyError,
    },
}

impl TranslateError {
    /// Caller mistakes (4xx-equivalent), as opposed to upstream failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslateError::EmptyText | TranslateError::UnsupportedLanguage(_)
        )
    }
}

/// Failure of a single endpoint strategy. Always recoverable by falling back.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("request signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("translation endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

impl From<reqwest::Error> for StrategyError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StrategyError::Timeout
        } else {
            StrategyError::Network(error)
        }
    }
}

/// The token seed could not be obtained or used.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("token seed page unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("token seed page returned {0}")]
    Status(StatusCode),

    #[error("token seed not found in page")]
    SeedNotFound,

    #[error("invalid token seed '{0}'")]
    InvalidSeed(String),
}

/// The response body did not have the nested-array shape we expect.
#[derive(Debug, Error)]
#[error("Failed to parse translation response: {reason}")]
pub struct MalformedResponse {
    pub reason: String,
    /// Untouched body, kept only when the caller asked for raw output.
    pub raw: Option<String>,
}

impl MalformedResponse {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: Option<String>) -> Self {
        self.raw = raw;
        self
    }
}
