//! Error types for relay operations.
//!
//! [`RelayError`] aborts an operation. [`DeliveryError`] describes why a
//! single destination did not take an event; it is recorded in the
//! [`PublishReport`](super::PublishReport) and never aborts a publish.

use std::time::Duration;

use thiserror::Error;

/// Errors that abort a relay operation.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Publish was called with an empty destination list.
    #[error("No destinations to publish to")]
    NoDestinations,

    /// Invalid relay URL.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// Connection to relay failed.
    #[error("Failed to connect to relay {url}: {reason}")]
    Connection {
        /// The relay URL that failed.
        url: String,
        /// The reason for the failure.
        reason: String,
    },
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Why one destination failed to take an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// No acknowledgement within the configured timeout.
    #[error("Delivery timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The destination answered and refused the event.
    #[error("Destination rejected event: {0}")]
    Rejected(String),

    /// The transport failed before an answer arrived.
    #[error("Failed to publish event: {0}")]
    Publish(String),

    /// The event could not be converted for this destination.
    #[error("Event not accepted for delivery: {0}")]
    InvalidEvent(String),
}
