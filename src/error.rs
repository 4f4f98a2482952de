//! Error types for hopstream
//!
//! Every failure a subscription can end with falls in one of three
//! families: bad configuration, the network, or an upstream body that does
//! not look like a page of records. [`Error::kind`] exposes that split so
//! callers need not match on individual variants.

use thiserror::Error;

/// The main error type for hopstream
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Page {page} is below the first page index {first_page}")]
    PageOutOfRange { page: u32, first_page: u32 },

    // ============================================================================
    // Network Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Failed to decode page {page}: {message}")]
    Decode { page: u32, message: String },

    #[error("Failed to encode JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Local I/O
    // ============================================================================
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad failure family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any request was sent
    Config,
    /// Transport failure, timeout or non-2xx status
    Network,
    /// Upstream body could not be read as records
    Decode,
    /// Local files and sockets
    Io,
}

impl Error {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error for a page
    pub fn decode(page: u32, message: impl Into<String>) -> Self {
        Self::Decode {
            page,
            message: message.into(),
        }
    }

    /// Failure family of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_)
            | Error::FileNotFound { .. }
            | Error::PageOutOfRange { .. } => ErrorKind::Config,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::Timeout { .. } => ErrorKind::Network,
            Error::Decode { .. } | Error::JsonParse(_) => ErrorKind::Decode,
            Error::Bind { .. } | Error::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    pub fn is_decode(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }
}

/// Result type alias for hopstream
pub type Result<T> = std::result::Result<T, Error>;
