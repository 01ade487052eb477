//! The single HTTP round trip every API operation goes through.
//!
//! [`execute`] sends one fully prepared request under a [`Context`], reads the
//! whole body, and sorts the result into an [`Outcome`]:
//!
//! | What happened | Outcome |
//! |---------------|---------|
//! | No response (DNS, refused, TLS, cancelled, deadline, body read) | [`Outcome::TransportFailure`] |
//! | Status < 400, body decoded into `T` | [`Outcome::Success`] |
//! | Status < 400, body does not decode into `T` | [`Outcome::TransportFailure`] |
//! | 400 <= status < 500 | [`Outcome::BadResponse`] with the body as client error |
//! | status >= 500 | [`Outcome::BadResponse`] with the body as server error |
//!
//! The executor never retries and never recovers; retry decisions belong to
//! the caller (see [`crate::is_temporary`]).

use std::fmt;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::context::Context;
use crate::error::{ApiError, Error};

/// A request that never produced a usable response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP exchange itself failed (DNS, connection refused, TLS, client timeout).
    #[error("failed making HTTP request: {0}")]
    Http(#[source] reqwest::Error),

    /// The response arrived but its body could not be read to the end.
    #[error("failed reading response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A successful response carried a body that is not the expected JSON.
    #[error("failed decoding response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint could not be joined onto the API base URL.
    #[error("invalid request URL for endpoint {endpoint}: {source}")]
    InvalidUrl {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The caller cancelled the [`Context`] while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The [`Context`] deadline passed while the request was in flight.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl TransportError {
    /// True when the failure came from the caller's [`Context`] rather than the network.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Body text of a bad response, tagged by which side of the exchange failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// Status 400-499.
    Client(String),
    /// Status 500 and above.
    Server(String),
}

/// A response with status >= 400.
///
/// The body is kept as opaque text; the API gives no guarantee that error
/// bodies are JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadResponse {
    status: u16,
    url: String,
    body: ErrorBody,
}

impl BadResponse {
    /// Classifies a completed response. Returns `None` for status < 400.
    #[must_use]
    pub fn from_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Option<Self> {
        let body = match status {
            0..400 => return None,
            400..500 => ErrorBody::Client(body.into()),
            _ => ErrorBody::Server(body.into()),
        };
        Some(Self {
            status,
            url: url.into(),
            body,
        })
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body text when the status was 4xx.
    #[must_use]
    pub fn client_err(&self) -> Option<&str> {
        match &self.body {
            ErrorBody::Client(text) => Some(text),
            ErrorBody::Server(_) => None,
        }
    }

    /// Body text when the status was 5xx.
    #[must_use]
    pub fn server_err(&self) -> Option<&str> {
        match &self.body {
            ErrorBody::Server(text) => Some(text),
            ErrorBody::Client(_) => None,
        }
    }
}

impl fmt::Display for BadResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ErrorBody::Client(text) => write!(
                f,
                "HTTP {} from {} (client error: {text})",
                self.status, self.url
            ),
            ErrorBody::Server(text) => write!(
                f,
                "HTTP {} from {} (server error: {text})",
                self.status, self.url
            ),
        }
    }
}

/// Result of one round trip. Exactly one variant holds per call.
#[derive(Debug)]
pub enum Outcome<T> {
    TransportFailure(TransportError),
    BadResponse(BadResponse),
    Success(T),
}

impl<T> Outcome<T> {
    /// Converts into a `Result`, attaching a description of the operation to
    /// any failure. `operation` is only evaluated on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] for the two failure variants.
    pub fn into_result<F>(self, operation: F) -> Result<T, Error>
    where
        F: FnOnce() -> String,
    {
        match self {
            Self::Success(value) => Ok(value),
            Self::TransportFailure(source) => Err(Error::transport(operation(), source)),
            Self::BadResponse(response) => Err(Error::api(operation(), ApiError::new(response))),
        }
    }
}

/// The `{"data": ...}` wrapper around every successful payload.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: T,
}

/// Method, endpoint, pre-encoded JSON body and query parameters of one call.
///
/// The body is encoded once, at construction, so the same spec always puts
/// the same bytes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    endpoint: &'static str,
    body: Vec<u8>,
    query: Vec<(&'static str, String)>,
}

impl RequestSpec {
    /// A POST to `endpoint` carrying `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `body` cannot be encoded.
    pub fn post<B>(endpoint: &'static str, body: &B) -> Result<Self, serde_json::Error>
    where
        B: Serialize + ?Sized,
    {
        Ok(Self {
            method: Method::POST,
            endpoint,
            body: serde_json::to_vec(body)?,
            query: Vec::new(),
        })
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    /// Resolves the endpoint and query parameters against the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the join fails.
    pub fn url(&self, base: &Url) -> Result<Url, TransportError> {
        let mut url = base
            .join(self.endpoint)
            .map_err(|source| TransportError::InvalidUrl {
                endpoint: self.endpoint.to_string(),
                source,
            })?;
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

/// Sends `request` and classifies what comes back.
///
/// The whole exchange, including reading the body, runs under `ctx`;
/// cancellation or deadline expiry at any point yields
/// [`TransportError::Cancelled`] / [`TransportError::DeadlineExceeded`].
#[instrument(level = "debug", skip_all, fields(method = %request.method(), url = %request.url()))]
pub async fn execute<T>(ctx: &Context, http: &reqwest::Client, request: reqwest::Request) -> Outcome<T>
where
    T: DeserializeOwned,
{
    let round_trip = async {
        let response = http.execute(request).await.map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Body {
                url: url.clone(),
                source,
            })?;
        Ok::<_, TransportError>((status, url, body))
    };

    let (status, url, body) = match ctx.run(round_trip).await {
        Ok(Ok(parts)) => parts,
        Ok(Err(error)) | Err(error) => {
            debug!(error = %error, "request did not complete");
            return Outcome::TransportFailure(error);
        }
    };

    debug!(status, bytes = body.len(), "response received");

    if let Some(bad) = BadResponse::from_status(status, url.as_str(), String::from_utf8_lossy(&body)) {
        return Outcome::BadResponse(bad);
    }

    // An empty success body decodes as JSON null so `()`/`Option` targets still work.
    let payload: &[u8] = if body.is_empty() { b"null" } else { &body };
    match serde_json::from_slice(payload) {
        Ok(value) => Outcome::Success(value),
        Err(source) => {
            trace!(body = %String::from_utf8_lossy(&body), "undecodable success body");
            Outcome::TransportFailure(TransportError::Decode { url, source })
        }
    }
}
