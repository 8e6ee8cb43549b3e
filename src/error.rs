// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Nyron
//!
//! `NyronError` and `ApiError` are the error types returned from fallible
//! operations. `ErrorInfo` is the plain data form that travels across task
//! boundaries inside stream fragments and turn outcomes.

use std::fmt;

use thiserror::Error;

/// Main error type for Nyron operations
#[derive(Error, Debug)]
pub enum NyronError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal setup or drawing errors
    #[error("Terminal error: {0}")]
    Tui(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The receiving side of a channel went away
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// Result type alias for Nyron operations
pub type Result<T> = std::result::Result<T, NyronError>;

/// Broad classification of a failure reported to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider could not be reached or rejected the request
    Transport,
    /// The provider answered with something we could not use
    Protocol,
    /// The agentic loop hit its round-trip cap
    TurnLimitExceeded,
    /// A deadline expired
    Timeout,
    /// The user cancelled the request
    Cancelled,
    /// A stream ended without a terminal signal
    Interrupted,
    /// The request was rejected before anything was sent
    InvalidInput,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Protocol => "protocol error",
            ErrorKind::TurnLimitExceeded => "turn limit exceeded",
            ErrorKind::Timeout => "timed out",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Interrupted => "interrupted",
            ErrorKind::InvalidInput => "invalid input",
        }
    }
}

/// Error detail carried as data over channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn turn_limit_exceeded(max_turns: usize) -> Self {
        Self::new(
            ErrorKind::TurnLimitExceeded,
            format!("turn limit exceeded: no final answer after {max_turns} round-trips"),
        )
    }

    pub fn timeout(what: &str, secs: u64) -> Self {
        Self::new(ErrorKind::Timeout, format!("{what} timed out after {secs}s"))
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "request cancelled")
    }

    pub fn interrupted() -> Self {
        Self::new(ErrorKind::Interrupted, "stream ended before completion")
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl From<&NyronError> for ErrorInfo {
    fn from(err: &NyronError) -> Self {
        let kind = match err {
            NyronError::Api(ApiError::InvalidResponse(_)) | NyronError::Json(_) => {
                ErrorKind::Protocol
            }
            NyronError::Api(ApiError::Timeout) => ErrorKind::Timeout,
            NyronError::InvalidInput(_) => ErrorKind::InvalidInput,
            NyronError::ChannelClosed(_) => ErrorKind::Cancelled,
            _ => ErrorKind::Transport,
        };
        ErrorInfo::new(kind, err.to_string())
    }
}

impl From<NyronError> for ErrorInfo {
    fn from(err: NyronError) -> Self {
        ErrorInfo::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nyron_error_config() {
        let err = NyronError::Config("bad config".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_nyron_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NyronError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_nyron_error_from_api_error() {
        let err: NyronError = ApiError::AuthenticationFailed.into();
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_api_error_server_error() {
        let err = ApiError::ServerError {
            status: 500,
            message: "internal server error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal server error"));
    }

    #[test]
    fn test_api_error_rate_limited() {
        let err = ApiError::RateLimited(30);
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_error_info_from_invalid_response_is_protocol() {
        let err: NyronError = ApiError::InvalidResponse("No choices in response".into()).into();
        let info = ErrorInfo::from(&err);
        assert_eq!(info.kind, ErrorKind::Protocol);
        assert!(info.message.contains("No choices"));
    }

    #[test]
    fn test_error_info_from_network_is_transport() {
        let err: NyronError = ApiError::Network("connection refused".into()).into();
        assert_eq!(ErrorInfo::from(err).kind, ErrorKind::Transport);
    }

    #[test]
    fn test_error_info_from_timeout() {
        let err: NyronError = ApiError::Timeout.into();
        assert_eq!(ErrorInfo::from(err).kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_turn_limit_info_is_distinct() {
        let info = ErrorInfo::turn_limit_exceeded(25);
        assert_eq!(info.kind, ErrorKind::TurnLimitExceeded);
        assert!(info.to_string().starts_with("turn limit exceeded"));
        assert!(info.message.contains("25"));
    }

    #[test]
    fn test_error_info_display() {
        let info = ErrorInfo::new(ErrorKind::Transport, "boom");
        assert_eq!(info.to_string(), "transport error: boom");
    }
}
