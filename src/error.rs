//! Error types for video generation and persistence.

use std::time::Duration;

/// Errors that can occur while generating or saving a video.
#[derive(Debug, thiserror::Error)]
pub enum GenVidError {
    /// Missing credential or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token rejected by the gateway.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Gateway returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body, trimmed and with tokens masked.
        message: String,
    },

    /// Rate limit or quota exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait, when the gateway sent one.
        retry_after: Option<Duration>,
    },

    /// Queued generation did not finish in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The provider reported that generation failed.
    #[error("video generation failed: {0}")]
    Generation(String),

    /// Gateway answered with a body we could not make sense of.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Downloading a returned video URL failed, by status or on the wire.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// URL that was being downloaded.
        url: String,
        /// HTTP status, absent when no response arrived.
        status: Option<u16>,
        /// What went wrong.
        message: String,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode inline (base64) video data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., creating the output directory or writing a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenVidError {
    /// Returns true if the inference call itself failed.
    pub fn is_gateway_error(&self) -> bool {
        matches!(
            self,
            Self::Auth(_)
                | Self::Api { .. }
                | Self::RateLimited { .. }
                | Self::Timeout(_)
                | Self::Generation(_)
                | Self::UnexpectedResponse(_)
                | Self::Network(_)
        )
    }

    /// Returns true if downloading the generated video failed.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Fetch error for a response with a failing status.
    pub(crate) fn fetch_status(url: &str, status: u16) -> Self {
        Self::Fetch {
            url: url.to_string(),
            status: Some(status),
            message: format!("HTTP {status}"),
        }
    }

    /// Fetch error for a download that broke before or while reading the body.
    pub(crate) fn fetch_transport(url: &str, source: &reqwest::Error) -> Self {
        Self::Fetch {
            url: url.to_string(),
            status: None,
            message: source.to_string(),
        }
    }

    /// Maps an HTTP status plus body text to a gateway error.
    pub(crate) fn from_status(status: u16, text: &str) -> Self {
        let message = sanitize_error_message(text);
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::RateLimited { retry_after: None },
            _ => Self::Api { status, message },
        }
    }
}

/// Result type alias for genvid operations.
pub type Result<T> = std::result::Result<T, GenVidError>;

const MAX_ERROR_LEN: usize = 500;

/// Trims an error body down to something fit for a log line.
///
/// Bearer tokens echoed back by the gateway are masked.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let masked: String = text
        .split_whitespace()
        .map(|word| {
            if word.starts_with("hf_") && word.len() > 8 {
                "hf_***"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if masked.chars().count() > MAX_ERROR_LEN {
        let truncated: String = masked.chars().take(MAX_ERROR_LEN).collect();
        format!("{truncated}...")
    } else {
        masked
    }
}
