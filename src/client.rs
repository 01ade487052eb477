//! Per-server entry point shared by all resource builders.
//!
//! A [`Client`] owns one `reqwest::Client` (and with it one connection pool),
//! the API base URL and the default headers. Cloning a `Client` is cheap and
//! shares all of that. Resource builders copy the default headers into each
//! request they send and never modify the shared set.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::attachments::AttachmentsClient;
use crate::collections::CollectionsClient;
use crate::context::Context;
use crate::documents::DocumentsClient;
use crate::error::Error;
use crate::request::{Envelope, Outcome, RequestSpec, TransportError, execute};
use crate::user_agent;

/// Default connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const JSON: &str = "application/json";

/// Path appended to the server URL to reach the RPC-style API.
const API_PATH: &str = "api/";

/// Entry point for one Outline server.
///
/// # Example
///
/// ```no_run
/// use outline_core::{Client, Context};
///
/// # async fn example() -> Result<(), outline_core::Error> {
/// let client = Client::new("https://docs.example.com", "api-key")?;
/// let collection = client
///     .collections()
///     .get("497f6eca-6276-4993-bfeb-53cbbbba6f08")
///     .send(&Context::background())
///     .await?;
/// println!("{}", collection.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
}

impl fmt::Debug for Client {
    // Headers carry the API key, so only the base URL is shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client with default timeouts and user agent.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new(server_url: &str, api_key: impl Into<String>) -> Result<Self, Error> {
        Self::builder(server_url, api_key).build()
    }

    /// Starts configuring a client for `server_url`.
    #[must_use]
    pub fn builder(server_url: &str, api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server_url, api_key)
    }

    /// Operations on collections.
    #[must_use]
    pub fn collections(&self) -> CollectionsClient {
        CollectionsClient::new(self.clone())
    }

    /// Operations on documents.
    #[must_use]
    pub fn documents(&self) -> DocumentsClient {
        DocumentsClient::new(self.clone())
    }

    /// Operations on attachments.
    #[must_use]
    pub fn attachments(&self) -> AttachmentsClient {
        AttachmentsClient::new(self.clone())
    }

    /// The API base URL, always ending in `/api/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Builds the HTTP request for `spec`: a private copy of the default
    /// headers, the resolved URL and the encoded body.
    fn prepare(&self, spec: &RequestSpec) -> Result<reqwest::Request, TransportError> {
        let url = spec.url(&self.inner.base_url)?;
        self.inner
            .http
            .request(spec.method().clone(), url)
            .headers(self.inner.headers.clone())
            .body(spec.body().to_vec())
            .build()
            .map_err(TransportError::Http)
    }

    /// One round trip for `spec`, decoding a successful body as `T`.
    pub(crate) async fn execute<T>(&self, ctx: &Context, spec: &RequestSpec) -> Outcome<T>
    where
        T: DeserializeOwned,
    {
        match self.prepare(spec) {
            Ok(request) => execute(ctx, &self.inner.http, request).await,
            Err(error) => Outcome::TransportFailure(error),
        }
    }

    /// One round trip for `spec`, unwrapping the `{"data": T}` envelope.
    ///
    /// Never returns both a value and an error: on failure the error carries
    /// `operation` as context.
    #[instrument(level = "debug", skip(self, ctx, spec, operation), fields(endpoint = spec.endpoint()))]
    pub(crate) async fn call<T, F>(&self, ctx: &Context, spec: &RequestSpec, operation: F) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: FnOnce() -> String,
    {
        let envelope: Envelope<T> = self.execute(ctx, spec).await.into_result(operation)?;
        Ok(envelope.data)
    }
}

/// Configuration for a [`Client`].
pub struct ClientBuilder {
    server_url: String,
    api_key: String,
    http: Option<reqwest::Client>,
    connect_timeout: Duration,
    request_timeout: Duration,
    user_agent: String,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("server_url", &self.server_url)
            .field("api_key", &"<redacted>")
            .field("custom_http", &self.http.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientBuilder {
    #[must_use]
    pub fn new(server_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            server_url: server_url.to_string(),
            api_key: api_key.into(),
            http: None,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: user_agent::default_user_agent(),
        }
    }

    /// Uses a caller-supplied HTTP client (proxies, TLS roots, test transports).
    ///
    /// The timeouts below are ignored in that case; configure them on `http`.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the server URL cannot be parsed as a base URL
    /// - [`Error::InvalidHeader`] if the key or user agent is not a valid header value
    /// - [`Error::ClientBuild`] if the HTTP client cannot be constructed
    #[instrument(level = "debug", skip(self), fields(server = %self.server_url))]
    pub fn build(self) -> Result<Client, Error> {
        let base_url = api_base_url(&self.server_url)?;
        let headers = default_headers(&self.api_key, &self.user_agent)?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .connect_timeout(self.connect_timeout)
                .timeout(self.request_timeout)
                .gzip(true)
                .build()
                .map_err(|source| Error::ClientBuild { source })?,
        };

        debug!(base_url = %base_url, "client ready");

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                headers,
            }),
        })
    }
}

/// `https://host/prefix/` → `https://host/prefix/api/`; trailing slashes on
/// the server URL are ignored.
fn api_base_url(server_url: &str) -> Result<Url, Error> {
    let invalid = |source| Error::InvalidUrl {
        url: server_url.to_string(),
        source,
    };
    let server = Url::parse(&format!("{}/", server_url.trim_end_matches('/'))).map_err(invalid)?;
    if server.cannot_be_a_base() {
        return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    server.join(API_PATH).map_err(invalid)
}

fn default_headers(api_key: &str, user_agent: &str) -> Result<HeaderMap, Error> {
    let mut authorization =
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| Error::InvalidHeader {
            header: "Authorization",
        })?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|_| Error::InvalidHeader {
            header: "User-Agent",
        })?,
    );
    Ok(headers)
}
