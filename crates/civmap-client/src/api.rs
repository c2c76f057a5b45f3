//! The backend seam the Data Store talks to, and its HTTP implementation on
//! top of the relay.

use std::future::Future;

use civmap_core::Location;

use crate::envelope::Pagination;
use crate::error::ClientError;
use crate::normalize::normalize_records;
use crate::query::LocationQuery;
use crate::relay::RelayClient;

/// One page of normalized locations.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPage {
    pub locations: Vec<Location>,
    pub pagination: Pagination,
    /// The backend could not run the search itself; callers should filter
    /// the cached list client-side.
    pub search_fallback: bool,
    pub search_error: Option<String>,
    pub message: Option<String>,
}

/// Source of location pages.
pub trait LocationBackend: Send + Sync {
    /// Fetches the page described by `query`.
    fn fetch_page(
        &self,
        query: &LocationQuery,
    ) -> impl Future<Output = Result<LocationPage, ClientError>> + Send;
}

/// [`LocationBackend`] backed by the upstream REST API.
#[derive(Debug, Clone)]
pub struct PortalApi {
    relay: RelayClient,
}

impl PortalApi {
    #[must_use]
    pub fn new(relay: RelayClient) -> Self {
        Self { relay }
    }

    #[must_use]
    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }
}

impl LocationBackend for PortalApi {
    /// # Errors
    ///
    /// - [`ClientError::AllEndpointsFailed`] if no endpoint answered.
    /// - [`ClientError::Relay`] if an endpoint answered with `success: false`
    ///   (including a non-JSON body).
    async fn fetch_page(&self, query: &LocationQuery) -> Result<LocationPage, ClientError> {
        let envelope = self.relay.relay(query).await;

        if !envelope.success {
            return Err(match envelope.error {
                Some(message) => ClientError::AllEndpointsFailed { message },
                None => ClientError::Relay {
                    message: envelope.message,
                },
            });
        }

        let locations = normalize_records(&envelope.data);
        if locations.len() < envelope.data.len() {
            tracing::warn!(
                received = envelope.data.len(),
                kept = locations.len(),
                "some location records were dropped during normalization"
            );
        }

        Ok(LocationPage {
            locations,
            pagination: envelope.pagination,
            search_fallback: envelope.search_fallback,
            search_error: envelope.search_error,
            message: Some(envelope.message),
        })
    }
}
