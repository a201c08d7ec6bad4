//! Fetch error types shared by page and image fetching.

use thiserror::Error;

/// Transport-level failure reported by an HTTP client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct NetworkError {
    message: String,
    timed_out: bool,
}

impl NetworkError {
    /// Creates a connection error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Returns whether the request timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

/// Bytes that could not be turned into an image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// Coarse error category handed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection failure or timeout.
    Network,
    /// Server answered with an unexpected status.
    HttpStatus,
    /// Listing body was malformed or had an unexpected shape.
    Parse,
    /// Image payload could not be decoded.
    Decode,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::HttpStatus => write!(f, "http status"),
            Self::Parse => write!(f, "parse"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

/// Failure of a single page or image fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("failed to parse listing: {message}")]
    Parse { message: String },

    #[error("failed to decode image: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates status error.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::HttpStatus { status }
    }

    /// Creates parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns the category reported to the view.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<NetworkError> for FetchError {
    fn from(err: NetworkError) -> Self {
        Self::network(err.message)
    }
}

impl From<DecodeError> for FetchError {
    fn from(err: DecodeError) -> Self {
        Self::decode(err.0)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
