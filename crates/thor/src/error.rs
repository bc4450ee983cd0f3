//! HTTP error types

use std::fmt;

use thiserror::Error;

/// HTTP operation exposed by the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Operation {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Post => "POST",
            Operation::Put => "PUT",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Operation> for reqwest::Method {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Get => reqwest::Method::GET,
            Operation::Post => reqwest::Method::POST,
            Operation::Put => reqwest::Method::PUT,
            Operation::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Failure to complete a round trip, or to read the response body
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The caller's cancellation token fired
    #[error("Request cancelled")]
    Cancelled,
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// DNS, connect or TLS failure
    #[error("Connection error: {0}")]
    Connection(String),
    /// Any other transport failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::Connection(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

/// HTTP errors that can occur while validating, building, sending or decoding a request
#[derive(Debug, Error)]
pub enum HttpError {
    /// URL could not be parsed, or has no scheme or host
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// URL as given by the caller
        url: String,
        /// Why it was rejected
        reason: String,
    },
    /// Request body cannot be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Request object could not be built (bad header name or value, bad method)
    #[error("Request construction error: {0}")]
    Construction(String),
    /// Round trip did not complete, no status code is known
    #[error("Network error: {0}")]
    Network(#[source] NetworkError),
    /// Response body could not be fully read
    #[error("Read error: {0}")]
    Read(#[source] NetworkError),
    /// Response body is not valid JSON for the destination type
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),
    /// Proxy error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
}

impl HttpError {
    /// Stable classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            HttpError::Serialization(_) => ErrorKind::Serialization,
            HttpError::Construction(_) => ErrorKind::Construction,
            HttpError::Network(_) => ErrorKind::Network,
            HttpError::Read(_) => ErrorKind::Read,
            HttpError::Decode(_) => ErrorKind::Decode,
            HttpError::Proxy(_) | HttpError::Build(_) => ErrorKind::Config,
        }
    }

    /// Whether the error was caused by the caller's cancellation token
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            HttpError::Network(NetworkError::Cancelled) | HttpError::Read(NetworkError::Cancelled)
        )
    }
}

/// Top level classification of an [`HttpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`HttpError::InvalidUrl`]
    InvalidUrl,
    /// See [`HttpError::Serialization`]
    Serialization,
    /// See [`HttpError::Construction`]
    Construction,
    /// See [`HttpError::Network`]
    Network,
    /// See [`HttpError::Read`]
    Read,
    /// See [`HttpError::Decode`]
    Decode,
    /// See [`HttpError::Proxy`] and [`HttpError::Build`]
    Config,
}

/// Error returned by the requester methods
///
/// Carries the operation that failed and the best-effort status code: `0` when
/// the request never got a response, the received status for read and decode
/// failures. The underlying [`HttpError`] is available through
/// [`std::error::Error::source`] or [`RequestError::inner`].
#[derive(Debug, Error)]
#[error("{operation} request failed: {source}")]
pub struct RequestError {
    operation: Operation,
    status: u16,
    #[source]
    source: HttpError,
}

impl RequestError {
    pub(crate) fn new(operation: Operation, status: u16, source: HttpError) -> Self {
        Self {
            operation,
            status,
            source,
        }
    }

    /// Operation that failed
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Status code received before the failure, `0` if none
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Classification of the wrapped error
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Wrapped error
    pub fn inner(&self) -> &HttpError {
        &self.source
    }

    /// Consume and return the wrapped error
    pub fn into_inner(self) -> HttpError {
        self.source
    }
}
