//! Error types for the news client and its configuration.
//!
//! Two families live here:
//! - [`NewsError`]: everything that can go wrong while fetching one page of
//!   articles (transport, remote rejection, undecodable body)
//! - [`ConfigError`]: startup problems, such as a missing API key
//!
//! Query failures never escape the cache as errors. They are flattened into a
//! cloneable [`ErrorInfo`] and stored in the query state for display.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Message shown when a failure carries no usable message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Failure of a single remote request.
#[derive(Error, Debug)]
pub enum NewsError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, reset).
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A 2xx body that is not a valid article list.
    #[error("failed to decode news response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no news API key configured (set NEWS_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("invalid news API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Broad classification of a query failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    Remote,
    Decode,
}

/// Display-ready description of a failed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Message suitable for showing to a reader.
    pub message: String,
    /// Remote error code (e.g. `apiKeyDisabled`), when the service sent one.
    pub code: Option<String>,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
}

impl ErrorInfo {
    pub fn generic(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: GENERIC_ERROR_MESSAGE.to_string(),
            code: None,
            status: None,
        }
    }
}

impl From<&NewsError> for ErrorInfo {
    fn from(err: &NewsError) -> Self {
        match err {
            NewsError::Remote {
                status,
                code,
                message,
            } => {
                let message = if message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    message.clone()
                };
                Self {
                    kind: ErrorKind::Remote,
                    message,
                    code: code.clone(),
                    status: Some(*status),
                }
            }
            NewsError::Network(e) => Self {
                status: e.status().map(|s| s.as_u16()),
                ..Self::generic(ErrorKind::Network)
            },
            NewsError::Decode(_) => Self::generic(ErrorKind::Decode),
        }
    }
}

impl From<NewsError> for ErrorInfo {
    fn from(err: NewsError) -> Self {
        Self::from(&err)
    }
}
