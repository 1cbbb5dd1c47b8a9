//! The delivery-handle abstraction used by the fan-out.

use async_trait::async_trait;

use super::error::DeliveryError;
use crate::nostr::Event;

/// Something that can take a signed event, typically one relay connection.
///
/// Implementations own their connection lifecycle; the fan-out only calls
/// [`deliver`](Self::deliver) and never retries.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Identifier used in outcomes and logs (a relay URL for relays).
    fn id(&self) -> &str;

    /// Delivers `event` and waits for the destination's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the destination refuses the event or
    /// the transport fails.
    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError>;
}
