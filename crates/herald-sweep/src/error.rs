use thiserror::Error;

use herald_store::StoreError;

/// The one sweep-fatal failure: no candidates means nothing can be
/// processed this tick, so the whole run reports as failed.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("candidate fetch failed: {0}")]
    Fetch(#[source] StoreError),
}

/// Rejection reason produced by a [`crate::MessageTransport`] impl.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Why a single (reminder, bucket) pair could not be delivered.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither a fixed notify chat nor an owner chat is available.
    #[error("no recipient: no notify chat configured and reminder has no owner")]
    NoRecipient,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
