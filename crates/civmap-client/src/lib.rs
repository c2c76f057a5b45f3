pub mod api;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod query;
pub mod relay;
pub(crate) mod retry;
pub mod store;

pub use api::{LocationBackend, LocationPage, PortalApi};
pub use envelope::{Pagination, RelayEnvelope};
pub use error::ClientError;
pub use normalize::{normalize_record, normalize_records};
pub use query::LocationQuery;
pub use relay::{RelayClient, RelaySettings};
pub use store::{LocationStore, StoreSnapshot};
