//! Builders for the collections resource.
//!
//! | Builder | Endpoint |
//! |---------|----------|
//! | [`CollectionsGetClient`] | `collections.info` |
//! | [`CollectionsListClient`] | `collections.list` (paginated) |
//! | [`CollectionsCreateClient`] | `collections.create` |
//! | [`CollectionsUpdateClient`] | `collections.update` |
//! | [`CollectionsDocumentStructureClient`] | `collections.documents` |

use serde::Serialize;

use crate::client::Client;
use crate::context::Context;
use crate::error::Error;
use crate::models::{Collection, CollectionId, DocumentStructure, Permission};
use crate::pagination::{Cursor, ListStep, PageRequest, paginate};
use crate::request::RequestSpec;
use crate::retry::RetryPolicy;

pub(crate) const INFO_ENDPOINT: &str = "collections.info";
pub(crate) const LIST_ENDPOINT: &str = "collections.list";
pub(crate) const CREATE_ENDPOINT: &str = "collections.create";
pub(crate) const UPDATE_ENDPOINT: &str = "collections.update";
pub(crate) const DOCUMENTS_ENDPOINT: &str = "collections.documents";

/// Entry point for collection operations. Obtain via [`Client::collections`].
#[derive(Debug, Clone)]
pub struct CollectionsClient {
    client: Client,
}

impl CollectionsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a single collection by ID.
    #[must_use]
    pub fn get(&self, id: impl Into<CollectionId>) -> CollectionsGetClient {
        CollectionsGetClient {
            client: self.client.clone(),
            params: IdParams { id: id.into() },
        }
    }

    /// Lists every collection visible to the API key.
    #[must_use]
    pub fn list(&self) -> CollectionsListClient {
        CollectionsListClient {
            client: self.client.clone(),
            cursor: Cursor::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a collection named `name`.
    #[must_use]
    pub fn create(&self, name: impl Into<String>) -> CollectionsCreateClient {
        CollectionsCreateClient {
            client: self.client.clone(),
            params: CreateParams {
                name: name.into(),
                ..CreateParams::default()
            },
        }
    }

    /// Updates the collection `id`. Only the fields set on the builder are sent.
    #[must_use]
    pub fn update(&self, id: impl Into<CollectionId>) -> CollectionsUpdateClient {
        CollectionsUpdateClient {
            client: self.client.clone(),
            params: UpdateParams {
                id: id.into(),
                ..UpdateParams::default()
            },
        }
    }

    /// Fetches the nested document tree of the collection `id`.
    #[must_use]
    pub fn document_structure(
        &self,
        id: impl Into<CollectionId>,
    ) -> CollectionsDocumentStructureClient {
        CollectionsDocumentStructureClient {
            client: self.client.clone(),
            params: IdParams { id: id.into() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct IdParams {
    id: CollectionId,
}

#[derive(Debug, Clone)]
pub struct CollectionsGetClient {
    client: Client,
    params: IdParams,
}

impl CollectionsGetClient {
    /// The request this builder would send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the body cannot be encoded.
    pub fn request(&self) -> Result<RequestSpec, Error> {
        RequestSpec::post(INFO_ENDPOINT, &self.params)
            .map_err(|source| Error::encode(self.operation(), source))
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] when the call fails.
    pub async fn send(self, ctx: &Context) -> Result<Collection, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed getting collection with id '{}'", self.params.id)
    }
}

#[derive(Debug, Clone)]
pub struct CollectionsListClient {
    client: Client,
    cursor: Cursor,
    retry: RetryPolicy,
}

impl CollectionsListClient {
    /// Page size to request; `0` leaves it to the server.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.cursor.limit = limit;
        self
    }

    /// How failed pages are retried when the callback asks to continue.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Streams every collection to `f`, page by page.
    ///
    /// `f` receives `Ok(collection)` for each item, or `Err(error)` when a
    /// page request fails. Returning [`ListStep::Continue`] after an error
    /// retries the same page; [`ListStep::Stop`] ends the run with the given
    /// result.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` stops with, the page error once the retry policy
    /// gives up, or a cancellation error if `ctx` is cancelled.
    pub async fn send<F, E>(self, ctx: &Context, f: F) -> Result<(), E>
    where
        F: FnMut(Result<Collection, Error>) -> ListStep<E>,
        E: From<Error>,
    {
        let spec = RequestSpec::post(LIST_ENDPOINT, &serde_json::Map::new())
            .map_err(|source| Error::encode("failed listing collections", source))?;
        let request = PageRequest {
            spec,
            cursor: self.cursor,
            retry: self.retry,
            operation: "failed listing collections",
        };
        paginate(&self.client, ctx, request, f).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct CreateParams {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission: Option<Permission>,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    color: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    private: bool,
}

#[derive(Debug, Clone)]
pub struct CollectionsCreateClient {
    client: Client,
    params: CreateParams,
}

impl CollectionsCreateClient {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.params.description = description.into();
        self
    }

    /// Workspace members may view the collection. Overrides [`Self::permission_read_write`].
    #[must_use]
    pub fn permission_read(mut self) -> Self {
        self.params.permission = Some(Permission::Read);
        self
    }

    /// Workspace members may edit the collection. Overrides [`Self::permission_read`].
    #[must_use]
    pub fn permission_read_write(mut self) -> Self {
        self.params.permission = Some(Permission::ReadWrite);
        self
    }

    /// Hex color, e.g. `#AABBCC`.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.params.color = color.into();
        self
    }

    #[must_use]
    pub fn private(mut self, private: bool) -> Self {
        self.params.private = private;
        self
    }

    /// The request this builder would send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the body cannot be encoded.
    pub fn request(&self) -> Result<RequestSpec, Error> {
        RequestSpec::post(CREATE_ENDPOINT, &self.params)
            .map_err(|source| Error::encode(self.operation(), source))
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] when the call fails.
    pub async fn send(self, ctx: &Context) -> Result<Collection, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed creating collection with name '{}'", self.params.name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct UpdateParams {
    id: CollectionId,
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission: Option<Permission>,
    #[serde(skip_serializing_if = "String::is_empty")]
    color: String,
}

#[derive(Debug, Clone)]
pub struct CollectionsUpdateClient {
    client: Client,
    params: UpdateParams,
}

impl CollectionsUpdateClient {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.params.name = name.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.params.description = description.into();
        self
    }

    #[must_use]
    pub fn permission_read(mut self) -> Self {
        self.params.permission = Some(Permission::Read);
        self
    }

    #[must_use]
    pub fn permission_read_write(mut self) -> Self {
        self.params.permission = Some(Permission::ReadWrite);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.params.color = color.into();
        self
    }

    /// The request this builder would send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the body cannot be encoded.
    pub fn request(&self) -> Result<RequestSpec, Error> {
        RequestSpec::post(UPDATE_ENDPOINT, &self.params)
            .map_err(|source| Error::encode(self.operation(), source))
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] when the call fails.
    pub async fn send(self, ctx: &Context) -> Result<Collection, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed updating collection with id '{}'", self.params.id)
    }
}

#[derive(Debug, Clone)]
pub struct CollectionsDocumentStructureClient {
    client: Client,
    params: IdParams,
}

impl CollectionsDocumentStructureClient {
    /// The request this builder would send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the body cannot be encoded.
    pub fn request(&self) -> Result<RequestSpec, Error> {
        RequestSpec::post(DOCUMENTS_ENDPOINT, &self.params)
            .map_err(|source| Error::encode(self.operation(), source))
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] when the call fails.
    pub async fn send(self, ctx: &Context) -> Result<DocumentStructure, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!(
            "failed getting document structure of collection with id '{}'",
            self.params.id
        )
    }
}
