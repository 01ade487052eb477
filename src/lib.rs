//! Outline Client Library
//!
//! A typed client for the Outline knowledge-base API: collections,
//! documents and attachments.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`request`] - Transport executor: one round trip, classified into an [`Outcome`]
//! - [`error`] - Error types and the temporary/permanent classification
//! - [`client`] - Shared HTTP client, base URL and default headers
//! - [`context`] - Cancellation and deadlines for in-flight calls
//! - [`pagination`] - Offset-based list driver with per-item callbacks
//! - [`retry`] - Retry policy for failed pages
//! - [`collections`], [`documents`], [`attachments`] - Fluent resource builders
//! - [`models`] - Response shapes
//!
//! # Example
//!
//! ```no_run
//! use outline_core::{Client, Context, Error, ListStep, is_temporary};
//!
//! # async fn example() -> Result<(), Error> {
//! let client = Client::new("https://docs.example.com", "api-key")?;
//! let ctx = Context::background();
//!
//! client
//!     .collections()
//!     .list()
//!     .send(&ctx, |item: Result<_, Error>| match item {
//!         Ok(collection) => {
//!             println!("{}", collection.name);
//!             ListStep::Continue
//!         }
//!         Err(err) if is_temporary(&err) => ListStep::Continue,
//!         Err(err) => ListStep::fail(err),
//!     })
//!     .await
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attachments;
pub mod client;
pub mod collections;
pub mod context;
pub mod documents;
pub mod error;
pub mod models;
pub mod pagination;
pub mod request;
pub mod retry;
mod user_agent;

// Re-export commonly used types
pub use attachments::{AttachmentsClient, AttachmentsCreateClient};
pub use client::{CONNECT_TIMEOUT_SECS, Client, ClientBuilder, REQUEST_TIMEOUT_SECS};
pub use collections::{
    CollectionsClient, CollectionsCreateClient, CollectionsDocumentStructureClient,
    CollectionsGetClient, CollectionsListClient, CollectionsUpdateClient,
};
pub use context::Context;
pub use documents::{
    DocumentsClient, DocumentsCreateClient, DocumentsGetClient, DocumentsListClient,
    DocumentsUpdateClient,
};
pub use error::{ApiError, Error, Temporary, is_temporary};
pub use models::{
    Attachment, AttachmentDetails, Collection, CollectionId, Document, DocumentId,
    DocumentShareId, DocumentStructure, DocumentSummary, DocumentUrlId, Permission, Sort, User,
    UserId,
};
pub use pagination::{Cursor, ListStep, Pagination};
pub use request::{BadResponse, ErrorBody, Outcome, RequestSpec, TransportError, execute};
pub use retry::{RetryDecision, RetryPolicy};
