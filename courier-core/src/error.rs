//! Crate-level error type for the [`Courier`](crate::Courier) facade.

use thiserror::Error;

use crate::nostr::NostrError;
use crate::relay::RelayError;

/// Errors returned by [`Courier`](crate::Courier) operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Key handling, signing, or encryption failed.
    #[error(transparent)]
    Nostr(#[from] NostrError),

    /// Publishing could not start.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Result type for [`Courier`](crate::Courier) operations.
pub type CourierResult<T> = Result<T, CourierError>;
