//! Builders for the attachments resource.
//!
//! Creating an attachment only reserves it: the response tells the caller
//! where and how to upload the bytes. Uploading is left to the caller.

use serde::Serialize;

use crate::client::Client;
use crate::context::Context;
use crate::error::Error;
use crate::models::{Attachment, DocumentId};
use crate::request::RequestSpec;

pub(crate) const CREATE_ENDPOINT: &str = "attachments.create";

/// Entry point for attachment operations. Obtain via [`Client::attachments`].
#[derive(Debug, Clone)]
pub struct AttachmentsClient {
    client: Client,
}

impl AttachmentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Reserves an attachment of `size` bytes named `name`.
    #[must_use]
    pub fn create(
        &self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> AttachmentsCreateClient {
        AttachmentsCreateClient {
            client: self.client.clone(),
            params: CreateParams {
                name: name.into(),
                content_type: content_type.into(),
                size,
                document_id: DocumentId::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    name: String,
    content_type: String,
    size: u64,
    #[serde(skip_serializing_if = "DocumentId::is_empty")]
    document_id: DocumentId,
}

#[derive(Debug, Clone)]
pub struct AttachmentsCreateClient {
    client: Client,
    params: CreateParams,
}

impl AttachmentsCreateClient {
    /// Associates the attachment with a document.
    #[must_use]
    pub fn document_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.params.document_id = id.into();
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
    pub async fn send(self, ctx: &Context) -> Result<Attachment, Error> {
        let spec = self.request()?;
        self.client.call(ctx, &spec, || self.operation()).await
    }

    fn operation(&self) -> String {
        format!("failed creating attachment '{}'", self.params.name)
    }
}
