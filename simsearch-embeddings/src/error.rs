use std::time::Duration;

use simsearch_core::EmbeddingError;
use thiserror::Error;

const INSUFFICIENT_QUOTA: &str = "insufficient_quota";

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("api error {status}: {message} (code={code:?})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        retry_after_seconds: Option<u64>,
    },
}

impl From<EmbeddingProviderError> for EmbeddingError {
    fn from(error: EmbeddingProviderError) -> Self {
        match error {
            EmbeddingProviderError::InvalidResponse(message) => {
                EmbeddingError::InvalidResponse(message)
            }
            EmbeddingProviderError::Request(message) => EmbeddingError::Provider(message),
            EmbeddingProviderError::Api {
                status: 401 | 403,
                message,
                ..
            } => EmbeddingError::Authentication(message),
            EmbeddingProviderError::Api {
                status: 429,
                code,
                message,
                retry_after_seconds,
            } => {
                if code.as_deref() == Some(INSUFFICIENT_QUOTA) {
                    EmbeddingError::QuotaExceeded(message)
                } else {
                    EmbeddingError::RateLimited {
                        retry_after: retry_after_seconds.map(Duration::from_secs),
                    }
                }
            }
            EmbeddingProviderError::Api {
                status, message, ..
            } => EmbeddingError::Provider(format!("HTTP {status}: {message}")),
        }
    }
}
