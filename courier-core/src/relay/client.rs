//! Relay-backed [`Destination`] over a `nostr-sdk` client.
//!
//! Each [`RelayDestination`] owns one client connected to exactly one relay,
//! so the fan-out gets an independent outcome per relay. Framing of the
//! `["EVENT", ...]` message and the `OK` acknowledgement is left to
//! `nostr-sdk`.

use std::time::Duration;

use async_trait::async_trait;
use nostr::{JsonUtil, RelayUrl};
use nostr_sdk::Client;

use super::destination::Destination;
use super::error::{DeliveryError, RelayError, RelayResult};
use crate::nostr::Event;

/// Default timeout for establishing a relay connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A single relay connection usable as a publish destination.
pub struct RelayDestination {
    url: String,
    client: Client,
}

impl std::fmt::Debug for RelayDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDestination")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl RelayDestination {
    /// Connects to the relay at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUrl`] if `url` does not parse as a relay
    /// URL, or [`RelayError::Connection`] if the relay is not connected
    /// within `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> RelayResult<Self> {
        let relay_url =
            RelayUrl::parse(url).map_err(|e| RelayError::InvalidUrl(format!("{url}: {e}")))?;
        let url = relay_url.to_string();

        let client = Client::builder().build();
        client
            .add_relay(relay_url.as_str())
            .await
            .map_err(|e| RelayError::Connection {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        client.connect().await;

        let connected = tokio::time::timeout(connect_timeout, async {
            loop {
                if client
                    .relays()
                    .await
                    .values()
                    .any(nostr_sdk::Relay::is_connected)
                {
                    break;
                }
                tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok();

        if !connected {
            client.disconnect().await;
            return Err(RelayError::Connection {
                url,
                reason: format!("not connected within {}s", connect_timeout.as_secs_f64()),
            });
        }

        log::info!("Connected to relay {url}");
        Ok(Self { url, client })
    }

    /// The normalized relay URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Closes the connection.
    pub async fn disconnect(&self) {
        self.client.disconnect().await;
        log::debug!("Disconnected from relay {}", self.url);
    }
}

#[async_trait]
impl Destination for RelayDestination {
    fn id(&self) -> &str {
        &self.url
    }

    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError> {
        let wire = to_wire_event(event)?;

        let output = self
            .client
            .send_event(&wire)
            .await
            .map_err(|e| DeliveryError::Publish(e.to_string()))?;

        if !output.success.is_empty() {
            return Ok(());
        }

        // failed is a HashMap<RelayUrl, String>
        match output.failed.into_values().next() {
            Some(reason) => Err(DeliveryError::Rejected(reason)),
            None => Err(DeliveryError::Publish(
                "relay gave no acknowledgement".to_string(),
            )),
        }
    }
}

/// Converts through the NIP-01 JSON form and re-verifies with `nostr`.
fn to_wire_event(event: &Event) -> Result<nostr::Event, DeliveryError> {
    let json = event
        .to_json()
        .map_err(|e| DeliveryError::InvalidEvent(e.to_string()))?;
    let wire =
        nostr::Event::from_json(json).map_err(|e| DeliveryError::InvalidEvent(e.to_string()))?;
    wire.verify()
        .map_err(|e| DeliveryError::InvalidEvent(e.to_string()))?;
    Ok(wire)
}
