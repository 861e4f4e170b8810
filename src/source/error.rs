//! Transport failure classification

use std::time::Duration;
use thiserror::Error;

/// Why a fetch from the upstream failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("upstream unreachable: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("upstream server error: HTTP {status}")]
    Server { status: u16 },

    #[error("unexpected upstream response: HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, retry_after_secs: Option<u64>) -> Self {
        match status {
            429 => FetchError::RateLimited { retry_after_secs },
            500..=599 => FetchError::Server { status },
            _ => FetchError::UnexpectedStatus { status },
        }
    }

    /// Classify a reqwest error without leaking its type
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16(), None)
        } else {
            FetchError::Network(err.to_string())
        }
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Timeout(_) => "timeout",
            FetchError::RateLimited { .. } => "rate_limited",
            FetchError::Server { .. } => "server",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::Decode(_) => "decode",
            FetchError::Client(_) => "client",
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Network(_) | FetchError::Client(_) => {
                "Could not reach the market data service. Check your connection.".to_string()
            }
            FetchError::Timeout(_) => "The market data service took too long to respond.".to_string(),
            FetchError::RateLimited {
                retry_after_secs: Some(secs),
            } => format!("Too many requests. Try again in {secs} seconds."),
            FetchError::RateLimited { .. } => {
                "Too many requests. Try again in a moment.".to_string()
            }
            FetchError::Server { .. } => {
                "The market data service is having problems. Try again later.".to_string()
            }
            FetchError::UnexpectedStatus { status } => {
                format!("The market data service returned an unexpected response ({status}).")
            }
            FetchError::Decode(_) => {
                "The market data service returned data that could not be read.".to_string()
            }
        }
    }
}
