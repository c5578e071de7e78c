// error.rs

use serde::Deserialize;
use std::fmt;

/// Error returned by the eero API itself.
///
/// Every response carries a "meta" envelope with an API-level status code and
/// an optional error message. This struct captures both the HTTP-level and
/// API-level error information and deserializes directly from "meta".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    /// HTTP status code of the response. Not part of the wire format.
    #[serde(skip)]
    pub http_status: u16,
    /// API-level status code from the "meta" envelope.
    #[serde(default)]
    pub code: i64,
    /// Human-readable error message from the API.
    #[serde(default, rename = "error")]
    pub message: String,
    /// Server timestamp from the "meta" envelope.
    #[serde(default)]
    pub server_time: String,
}

impl ApiError {
    /// Error used when the response body cannot be parsed as an envelope.
    /// The message reports only the byte length, never body content, so
    /// that secrets in a malformed response cannot leak into logs.
    pub(crate) fn unparseable(http_status: u16, body_len: usize) -> Self {
        Self {
            http_status,
            code: i64::from(http_status),
            message: format!("unparseable response body ({} bytes)", body_len),
            server_time: String::new(),
        }
    }

    /// Reports whether this error indicates an authentication failure, in
    /// which case the caller should re-run the login flow.
    pub fn is_auth_error(&self) -> bool {
        self.http_status == 401 || self.code == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "HTTP {}, API code {}", self.http_status, self.code)
        } else {
            write!(f, "HTTP {}, API code {}: {}", self.http_status, self.code, self.message)
        }
    }
}

/// Main error type for eero client operations
#[derive(Debug)]
pub enum EeroError {
    /// Parse URL failed (base URL or relative reference)
    InvalidUrl(String),
    /// Invalid client configuration
    Configuration(String),
    /// A server-supplied URL resolved to a host other than the configured
    /// origin. The request is refused rather than routed elsewhere.
    CrossHostTarget { expected: String, actual: String },
    /// Network-level failure (DNS, TLS, timeout); no response was obtained
    Transport(String),
    /// The server rejected the call, or returned an unparseable body
    Api(ApiError),
    /// JSON encoding of a request body or decoding of a payload failed
    Serialization(String),
}

impl EeroError {
    /// Returns the structured API error if this is an API-level failure.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Reports whether this error classifies as an authentication failure.
    pub fn is_auth_error(&self) -> bool {
        self.as_api_error().is_some_and(ApiError::is_auth_error)
    }
}

impl fmt::Display for EeroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Self::CrossHostTarget { expected, actual } => {
                write!(f, "Cross-host target refused: expected host '{}', got '{}'", expected, actual)
            }
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Api(err) => write!(f, "API error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for EeroError {}

impl From<url::ParseError> for EeroError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for EeroError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
