//! Error types for the ZeptoMail client.

use crate::transport::RawResponse;
use crate::validate::ValidationError;

/// Errors that can occur while talking to ZeptoMail.
///
/// Failures reported by the service itself (a non-2xx status or an `error`
/// object in the response envelope) are not represented here. They are
/// delivered in the [`WrappedResponse`](crate::WrappedResponse) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client could not be configured (bad base URL, proxy, TLS setup).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request payload failed its declared constraints. No I/O was done.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request payload could not be serialized to JSON.
    #[error("encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The HTTP request could not be assembled (e.g. a credential that is
    /// not a valid header value).
    #[error("new request failed: {0}")]
    Build(String),

    /// Network-level failure. `response` holds whatever part of the
    /// response had been observed, if any.
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
        response: Option<Box<RawResponse>>,
    },

    /// The body was not valid JSON for the expected shape. The raw
    /// response is kept so the body can still be inspected.
    #[error("decoding failed: {source}")]
    Decoding {
        #[source]
        source: serde_json::Error,
        response: Box<RawResponse>,
    },

    /// The caller's cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// The raw response attached to this error, if one was observed.
    pub fn raw_response(&self) -> Option<&RawResponse> {
        match self {
            Error::Request { response, .. } => response.as_deref(),
            Error::Decoding { response, .. } => Some(response),
            _ => None,
        }
    }

    /// `true` if the error was produced before any network I/O.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Validation(_) | Error::Encoding(_) | Error::Build(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Request {
            source,
            response: None,
        }
    }
}
