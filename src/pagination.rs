//! Offset-based pagination shared by every `*.list` operation.
//!
//! [`paginate`] requests one page at a time and hands each item to a caller
//! callback, strictly in order. The callback answers with a [`ListStep`]:
//!
//! - for an item: `Continue` moves on, `Stop(result)` ends the run with `result`;
//! - for a failed page: `Continue` asks for the same page again (subject to the
//!   [`RetryPolicy`]), `Stop(result)` ends the run with `result`.
//!
//! A page holding at most one item is taken as the last page. Cancellation of
//! the [`Context`] is never offered to the callback; it ends the run as an
//! error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::Client;
use crate::context::Context;
use crate::error::Error;
use crate::models::null_as_default;
use crate::request::{RequestSpec, TransportError};
use crate::retry::{RetryDecision, RetryPolicy};

/// Position of the next page request. Zero values are not sent, letting the
/// server apply its defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub limit: usize,
    pub offset: usize,
}

impl Cursor {
    fn apply(self, spec: RequestSpec) -> RequestSpec {
        let mut spec = spec;
        if self.limit > 0 {
            spec = spec.with_query("limit", self.limit);
        }
        if self.offset > 0 {
            spec = spec.with_query("offset", self.offset);
        }
        spec
    }
}

/// Pagination metadata the server sends alongside a page. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    #[serde(deserialize_with = "null_as_default")]
    pub limit: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub offset: usize,
    pub next_path: Option<String>,
}

/// `"data": null` decodes as an empty page.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// What a list callback wants to happen next.
#[derive(Debug)]
pub enum ListStep<E> {
    /// Keep going: next item, or retry the page that just failed.
    Continue,
    /// End the run and return this result from the list call.
    Stop(Result<(), E>),
}

impl<E> ListStep<E> {
    /// Ends the run successfully.
    #[must_use]
    pub fn stop() -> Self {
        Self::Stop(Ok(()))
    }

    /// Ends the run with `error`.
    #[must_use]
    pub fn fail(error: E) -> Self {
        Self::Stop(Err(error))
    }
}

/// Everything a list builder hands to [`paginate`] besides the callback.
#[derive(Debug)]
pub(crate) struct PageRequest {
    pub(crate) spec: RequestSpec,
    pub(crate) cursor: Cursor,
    pub(crate) retry: RetryPolicy,
    pub(crate) operation: &'static str,
}

/// Drives a list operation to completion. See the module docs for the
/// callback contract.
#[instrument(level = "debug", skip_all, fields(endpoint = request.spec.endpoint()))]
pub(crate) async fn paginate<T, F, E>(
    client: &Client,
    ctx: &Context,
    request: PageRequest,
    mut f: F,
) -> Result<(), E>
where
    T: DeserializeOwned,
    F: FnMut(Result<T, Error>) -> ListStep<E>,
    E: From<Error>,
{
    let PageRequest {
        spec,
        mut cursor,
        retry,
        operation,
    } = request;
    let mut failed_attempts: u32 = 0;

    loop {
        let page_spec = cursor.apply(spec.clone());
        let outcome = client.execute::<Page<T>>(ctx, &page_spec).await;
        let page = match outcome.into_result(|| operation.to_string()) {
            Ok(page) => page,
            Err(error) if error.is_cancelled() => return Err(error.into()),
            Err(error) => {
                failed_attempts = failed_attempts.saturating_add(1);
                debug!(offset = cursor.offset, failed_attempts, error = %error, "page request failed");

                let delay = match retry.should_retry(failed_attempts) {
                    RetryDecision::Retry { delay, .. } => delay,
                    RetryDecision::DoNotRetry { reason } => {
                        debug!(%reason, "giving up on page");
                        return Err(error.into());
                    }
                };

                match f(Err(error)) {
                    ListStep::Continue => {}
                    ListStep::Stop(result) => return result,
                }

                if !delay.is_zero() {
                    ctx.run(tokio::time::sleep(delay))
                        .await
                        .map_err(|source: TransportError| Error::transport(operation, source))?;
                }
                continue;
            }
        };

        failed_attempts = 0;
        let count = page.data.len();
        debug!(offset = cursor.offset, count, pagination = ?page.pagination, "page received");

        for item in page.data {
            if let ListStep::Stop(result) = f(Ok(item)) {
                return result;
            }
        }

        // Zero or one item means there is nothing left to fetch.
        if count <= 1 {
            return Ok(());
        }
        cursor.offset += count;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_null_data_is_empty() {
        let page: Page<serde_json::Value> =
            serde_json::from_str(r#"{"data":null,"pagination":{}}"#).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination, Some(Pagination::default()));
    }

    #[test]
    fn test_page_without_data_is_empty() {
        let page: Page<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_pagination_tolerates_null_numbers() {
        let pagination: Pagination =
            serde_json::from_str(r#"{"limit":null,"offset":null,"nextPath":null}"#).unwrap();
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn test_cursor_omits_zero_values() {
        let spec = RequestSpec::post("collections.list", &serde_json::json!({})).unwrap();
        assert!(Cursor::default().apply(spec.clone()).query().is_empty());

        let applied = Cursor {
            limit: 25,
            offset: 50,
        }
        .apply(spec);
        assert_eq!(
            applied.query(),
            [("limit", "25".to_string()), ("offset", "50".to_string())]
        );
    }
}
