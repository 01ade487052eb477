//! Error types and the temporary/permanent classification.
//!
//! A failed call is one of:
//! - a transport failure ([`TransportError`]), never temporary;
//! - a bad response ([`ApiError`]), temporary iff status >= 500 and != 501.
//!
//! [`is_temporary`] walks any error chain looking for an [`ApiError`] so
//! callers can decide between "retry after backoff" and "give up" without
//! matching on concrete types.
//!
//! # Example
//!
//! ```
//! use outline_core::{ApiError, BadResponse, Temporary, is_temporary};
//!
//! let response = BadResponse::from_status(503, "https://example.com/api/collections.info", "busy")
//!     .expect("503 is a bad response");
//! let error = ApiError::new(response);
//! assert!(error.is_temporary());
//! assert!(is_temporary(&error));
//! ```

use std::error::Error as StdError;

use thiserror::Error;

use crate::request::{BadResponse, TransportError};

/// HTTP 501: the server does not implement the operation, retrying never helps.
const STATUS_NOT_IMPLEMENTED: u16 = 501;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::ApiError {}
    impl Sealed for super::Error {}
}

/// Capability of errors that know whether retrying might succeed.
///
/// Implemented by [`ApiError`] and [`Error`] only. [`is_temporary`] finds
/// them anywhere in an error chain, so caller error types wrapping them need
/// no implementation of their own.
pub trait Temporary: sealed::Sealed {
    /// True when the same call, retried later without changes, may succeed.
    fn is_temporary(&self) -> bool;
}

/// A bad (status >= 400) response turned into an error value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad response: {response}")]
pub struct ApiError {
    response: BadResponse,
}

impl ApiError {
    #[must_use]
    pub fn new(response: BadResponse) -> Self {
        Self { response }
    }

    #[must_use]
    pub fn response(&self) -> &BadResponse {
        &self.response
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status()
    }
}

impl Temporary for ApiError {
    fn is_temporary(&self) -> bool {
        let status = self.response.status();
        status >= 500 && status != STATUS_NOT_IMPLEMENTED
    }
}

/// Errors returned by every client operation.
///
/// Each variant carries a description of the operation that failed, e.g.
/// `failed creating collection with name 'Engineering'`.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a usable response.
    #[error("{operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: TransportError,
    },

    /// The server answered with status >= 400.
    #[error("{operation}: {source}")]
    Api {
        operation: String,
        #[source]
        source: ApiError,
    },

    /// The request body could not be encoded as JSON.
    #[error("{operation}: failed encoding request body: {source}")]
    Encode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured server URL is not a valid base URL.
    #[error("invalid server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The API key or user agent contains characters not allowed in an HTTP header.
    #[error("invalid value for HTTP header {header}")]
    InvalidHeader { header: &'static str },

    /// The underlying HTTP client could not be constructed.
    #[error("failed building HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// Creates a transport error for `operation`.
    pub fn transport(operation: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a bad-response error for `operation`.
    pub fn api(operation: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a body-encoding error for `operation`.
    pub fn encode(operation: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            operation: operation.into(),
            source,
        }
    }

    /// True when the caller's context was cancelled or its deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_cancelled())
    }

    /// The bad response behind this error, if the server answered at all.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Temporary for Error {
    fn is_temporary(&self) -> bool {
        self.api_error().is_some_and(Temporary::is_temporary)
    }
}

/// Walks `err` and its sources and reports the first [`Temporary`] answer
/// found, or `false` if nothing in the chain can tell.
#[must_use]
pub fn is_temporary(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(error) = current {
        if let Some(api) = error.downcast_ref::<ApiError>() {
            return api.is_temporary();
        }
        current = error.source();
    }
    false
}
