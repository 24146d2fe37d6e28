//! Provider call failures

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP 429; never retried here, the caller decides whether to wait
    #[error("Provider rate limit hit, try again in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Provider returned HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Could not reach the provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Malformed provider JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP statuses worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 500 | 502 | 503 | 504 | 529)
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Transient failures: network trouble, timeouts, and retryable statuses
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { status, .. } => is_retryable_status(*status),
            Self::Network(_) | Self::Timeout(_) => true,
            Self::RateLimited { .. } | Self::InvalidResponse(_) | Self::Json(_) => false,
        }
    }

    /// Wait suggested by a rate-limited response
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> LlmError {
        LlmError::ApiError {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_transient_statuses_are_retried() {
        for status in [408, 500, 502, 503, 504, 529] {
            assert!(api(status).is_retryable(), "HTTP {status}");
        }
        for status in [400, 401, 403, 404, 429] {
            assert!(!api(status).is_retryable(), "HTTP {status}");
        }
    }

    #[test]
    fn test_rate_limit_is_not_retried() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert!(err.is_rate_limit());
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));
        assert_eq!(err.to_string(), "Provider rate limit hit, try again in 42s");
    }

    #[test]
    fn test_other_kinds() {
        assert!(LlmError::Timeout(Duration::from_secs(60)).is_retryable());
        assert!(!LlmError::InvalidResponse("no candidates".to_string()).is_retryable());
        assert_eq!(api(503).retry_after(), None);
        assert!(!api(503).is_rate_limit());
        assert_eq!(
            LlmError::Timeout(Duration::from_secs(60)).to_string(),
            "Provider did not answer within 60s"
        );
    }
}
