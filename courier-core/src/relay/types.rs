//! Types for publish configuration and results.

use std::time::Duration;

use super::error::DeliveryError;

/// Default per-destination delivery timeout.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`publish`](super::publish).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishConfig {
    /// Upper bound on each destination's delivery.
    pub timeout: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }
}

/// Outcome of delivering an event to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// The destination's identifier.
    pub destination: String,
    /// Whether the destination acknowledged the event.
    pub success: bool,
    /// Failure reason, when `success` is false.
    pub error: Option<DeliveryError>,
}

impl PublishOutcome {
    /// An acknowledged delivery.
    #[must_use]
    pub const fn accepted(destination: String) -> Self {
        Self {
            destination,
            success: true,
            error: None,
        }
    }

    /// A failed delivery.
    #[must_use]
    pub const fn failed(destination: String, error: DeliveryError) -> Self {
        Self {
            destination,
            success: false,
            error: Some(error),
        }
    }
}

/// Result of publishing an event to a set of destinations.
///
/// Holds exactly one outcome per destination, in the order the
/// destinations were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// The event ID that was published.
    pub event_id: String,
    /// Per-destination outcomes.
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    /// Returns true if at least one destination accepted the event.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().any(|o| o.success)
    }

    /// Returns the number of successful destinations.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    /// Returns the number of failed destinations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// Outcomes of destinations that accepted the event.
    pub fn succeeded(&self) -> impl Iterator<Item = &PublishOutcome> {
        self.outcomes.iter().filter(|o| o.success)
    }

    /// Outcomes of destinations that did not.
    pub fn failed(&self) -> impl Iterator<Item = &PublishOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}
