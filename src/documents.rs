//! Builders for the documents resource.

use serde::Serialize;

use crate::client::Client;
use crate::context::Context;
use crate::error::Error;
use crate::models::{CollectionId, Document, DocumentId, DocumentShareId};
use crate::pagination::{Cursor, ListStep, PageRequest, paginate};
use crate::request::RequestSpec;
use crate::retry::RetryPolicy;

pub(crate) const INFO_ENDPOINT: &str = "documents.info";
pub(crate) const LIST_ENDPOINT: &str = "documents.list";
pub(crate) const CREATE_ENDPOINT: &str = "documents.create";
pub(crate) const UPDATE_ENDPOINT: &str = "documents.update";

/// Entry point for document operations. Obtain via [`Client::documents`].
#[derive(Debug, Clone)]
pub struct DocumentsClient {
    client: Client,
}

impl DocumentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a document by ID.
    #[must_use]
    pub fn get(&self, id: impl Into<DocumentId>) -> DocumentsGetClient {
        DocumentsGetClient {
            client: self.client.clone(),
            selector: Selector::Id(id.into()),
        }
    }

    /// Fetches a document through one of its public share links.
    #[must_use]
    pub fn get_by_share_id(&self, share_id: impl Into<DocumentShareId>) -> DocumentsGetClient {
        DocumentsGetClient {
            client: self.client.clone(),
            selector: Selector::ShareId(share_id.into()),
        }
    }

    /// Lists documents, optionally narrowed to a collection or a parent document.
    #[must_use]
    pub fn list(&self) -> DocumentsListClient {
        DocumentsListClient {
            client: self.client.clone(),
            filter: ListFilter::default(),
            cursor: Cursor::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a document titled `title` in the collection `collection_id`.
    /// Drafts are created unless [`DocumentsCreateClient::publish`] is set.
    #[must_use]
    pub fn create(
        &self,
        title: impl Into<String>,
        collection_id: impl Into<CollectionId>,
    ) -> DocumentsCreateClient {
        DocumentsCreateClient {
            client: self.client.clone(),
            params: CreateParams {
                collection_id: collection_id.into(),
                title: title.into(),
                ..CreateParams::default()
            },
        }
    }

    /// Updates the document `id`.
    #[must_use]
    pub fn update(&self, id: impl Into<DocumentId>) -> DocumentsUpdateClient {
        DocumentsUpdateClient {
            client: self.client.clone(),
            params: UpdateParams {
                id: id.into(),
                ..UpdateParams::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
enum Selector {
    #[serde(rename = "id")]
    Id(DocumentId),
    #[serde(rename = "shareId")]
    ShareId(DocumentShareId),
}

impl Selector {
    fn describe(&self) -> String {
        match self {
            Self::Id(id) => format!("id '{id}'"),
            Self::ShareId(share_id) => format!("share id '{share_id}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentsGetClient {
    client: Client,
    selector: Selector,
}

impl DocumentsGetClient {
    /// The request this builder would send.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the body cannot be encoded.
    pub fn request(&self) -> Result<RequestSpec, Error> {
        RequestSpec::post(INFO_ENDPOINT, &self.selector)
            .map_err(|source| Error::encode(self.operation(), source))
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] or [`Error::Api`] when the call fails.
    pub async fn send(self, ctx: &Context) -> Result<Document, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed getting document with {}", self.selector.describe())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListFilter {
    #[serde(skip_serializing_if = "CollectionId::is_empty")]
    collection_id: CollectionId,
    #[serde(skip_serializing_if = "DocumentId::is_empty")]
    parent_document_id: DocumentId,
}

#[derive(Debug, Clone)]
pub struct DocumentsListClient {
    client: Client,
    filter: ListFilter,
    cursor: Cursor,
    retry: RetryPolicy,
}

impl DocumentsListClient {
    /// Only documents in this collection.
    #[must_use]
    pub fn collection(mut self, id: impl Into<CollectionId>) -> Self {
        self.filter.collection_id = id.into();
        self
    }

    /// Only direct children of this document.
    #[must_use]
    pub fn parent(mut self, id: impl Into<DocumentId>) -> Self {
        self.filter.parent_document_id = id.into();
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.cursor.limit = limit;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Streams every matching document to `f`. Same callback contract as
    /// [`crate::CollectionsListClient::send`].
    ///
    /// # Errors
    ///
    /// Returns whatever `f` stops with, the page error once the retry policy
    /// gives up, or a cancellation error if `ctx` is cancelled.
    pub async fn send<F, E>(self, ctx: &Context, f: F) -> Result<(), E>
    where
        F: FnMut(Result<Document, Error>) -> ListStep<E>,
        E: From<Error>,
    {
        let spec = RequestSpec::post(LIST_ENDPOINT, &self.filter)
            .map_err(|source| Error::encode("failed listing documents", source))?;
        let request = PageRequest {
            spec,
            cursor: self.cursor,
            retry: self.retry,
            operation: "failed listing documents",
        };
        paginate(&self.client, ctx, request, f).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    collection_id: CollectionId,
    title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    publish: bool,
    #[serde(skip_serializing_if = "DocumentId::is_empty")]
    parent_document_id: DocumentId,
    #[serde(skip_serializing_if = "DocumentId::is_empty")]
    template_id: DocumentId,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    template: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentsCreateClient {
    client: Client,
    params: CreateParams,
}

impl DocumentsCreateClient {
    /// Markdown body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.params.text = text.into();
        self
    }

    #[must_use]
    pub fn publish(mut self, publish: bool) -> Self {
        self.params.publish = publish;
        self
    }

    /// Nests the new document under `id`, which must be in the same collection.
    #[must_use]
    pub fn parent_document_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.params.parent_document_id = id.into();
        self
    }

    #[must_use]
    pub fn template_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.params.template_id = id.into();
        self
    }

    /// Creates a template rather than a regular document.
    #[must_use]
    pub fn template(mut self, template: bool) -> Self {
        self.params.template = template;
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
    pub async fn send(self, ctx: &Context) -> Result<Document, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!(
            "failed creating document '{}' in collection '{}'",
            self.params.title, self.params.collection_id
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct UpdateParams {
    id: DocumentId,
    #[serde(skip_serializing_if = "String::is_empty")]
    title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    append: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    publish: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentsUpdateClient {
    client: Client,
    params: UpdateParams,
}

impl DocumentsUpdateClient {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.params.title = title.into();
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.params.text = text.into();
        self
    }

    /// Appends [`Self::text`] to the existing body instead of replacing it.
    #[must_use]
    pub fn append(mut self, append: bool) -> Self {
        self.params.append = append;
        self
    }

    /// Publishes a draft. Has no effect on already published documents.
    #[must_use]
    pub fn publish(mut self, publish: bool) -> Self {
        self.params.publish = publish;
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
    pub async fn send(self, ctx: &Context) -> Result<Document, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed updating document with id '{}'", self.params.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn documents() -> DocumentsClient {
        Client::new("https://localhost.123", "api key")
            .unwrap()
            .documents()
    }

    fn body(spec: &RequestSpec) -> String {
        String::from_utf8(spec.body().to_vec()).unwrap()
    }

    #[test]
    fn test_get_by_id_and_share_id_bodies() {
        let by_id = documents().get("doc-1").request().unwrap();
        assert_eq!(by_id.endpoint(), "documents.info");
        assert_eq!(body(&by_id), r#"{"id":"doc-1"}"#);

        let by_share = documents().get_by_share_id("share-1").request().unwrap();
        assert_eq!(body(&by_share), r#"{"shareId":"share-1"}"#);
    }

    #[test]
    fn test_create_minimal_body() {
        let spec = documents().create("Title", "col-1").request().unwrap();
        assert_eq!(spec.endpoint(), "documents.create");
        assert_eq!(body(&spec), r#"{"collectionId":"col-1","title":"Title"}"#);
    }

    #[test]
    fn test_create_full_body() {
        let spec = documents()
            .create("Title", "col-1")
            .text("# Hello")
            .publish(true)
            .parent_document_id("parent")
            .template_id("tmpl")
            .request()
            .unwrap();
        assert_eq!(
            body(&spec),
            r##"{"collectionId":"col-1","title":"Title","text":"# Hello","publish":true,"parentDocumentId":"parent","templateId":"tmpl"}"##
        );
    }

    #[test]
    fn test_update_body_omits_unset_fields() {
        let spec = documents()
            .update("doc-1")
            .text("more")
            .append(true)
            .request()
            .unwrap();
        assert_eq!(spec.endpoint(), "documents.update");
        assert_eq!(body(&spec), r#"{"id":"doc-1","text":"more","append":true}"#);
    }

    #[test]
    fn test_building_twice_gives_identical_bodies() {
        let create = || {
            documents()
                .create("t", "c")
                .text("x")
                .publish(true)
                .request()
                .unwrap()
        };
        assert_eq!(create().body(), create().body());

        let update = || documents().update("d").title("t").request().unwrap();
        assert_eq!(update().body(), update().body());
    }

    #[test]
    fn test_list_filter_body() {
        let filter = ListFilter {
            collection_id: "col-1".into(),
            parent_document_id: DocumentId::default(),
        };
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"collectionId":"col-1"}"#
        );
        assert_eq!(
            serde_json::to_string(&ListFilter::default()).unwrap(),
            "{}"
        );
    }
}
