//! Error handling for the InnovaTube client

use std::fmt;
use thiserror::Error;

/// Unified error type for the InnovaTube client
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting (API key, base URL) is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote service answered outside the 2xx range
    #[error("{message}")]
    Http {
        /// HTTP status code of the response
        status: u16,
        /// Best message found in the response body
        message: String,
    },

    /// The request never completed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local input checks failed before anything was sent
    #[error("{0}")]
    Validation(String),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Session file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A search was abandoned because a newer one started
    #[error("search superseded by a newer query")]
    Superseded,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new HTTP error
    pub fn http<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Http {
            status,
            message: msg.to_string(),
        }
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message suitable for showing to a person.
    ///
    /// Server and local messages are kept verbatim; transport and plumbing
    /// failures collapse into `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Error::Config(msg) | Error::Validation(msg) => msg.clone(),
            Error::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            Error::Network(_) => "Could not connect to the server.".to_string(),
            _ => fallback.to_string(),
        }
    }
}
