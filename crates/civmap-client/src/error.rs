use thiserror::Error;

/// Errors returned by the location relay and backend client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The relay answered but reported `success: false`.
    #[error("location API error: {message}")]
    Relay { message: String },

    /// A raw record could not be turned into a location.
    #[error("cannot normalize record: {reason}")]
    Normalization { reason: String },

    #[error("all location endpoints failed: {message}")]
    AllEndpointsFailed { message: String },
}
