//! The [`Courier`] context: one identity, a clock, and publish settings.

use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::CourierResult;
use crate::nostr::{
    build_and_sign, giftwrap, EnvelopeOptions, Event, KeyPair, OpenedMessage, PublicKey,
    KIND_TEXT_NOTE,
};
use crate::relay::{publish, Destination, PublishConfig, PublishReport};

/// Core interface for Courier functionality.
///
/// Holds the signing identity and the settings used to build and publish
/// events. Destinations are passed per call and stay owned by the caller.
///
/// # Examples
///
/// ```
/// use courier_core::nostr::KeyPair;
/// use courier_core::Courier;
///
/// let courier = Courier::new(KeyPair::generate().unwrap());
/// let note = courier.text_note("hello nostr").unwrap();
/// assert_eq!(note.pubkey, courier.public_key());
/// ```
pub struct Courier {
    keys: KeyPair,
    clock: Arc<dyn Clock>,
    envelope: EnvelopeOptions,
    publish_config: PublishConfig,
}

impl Courier {
    /// Creates a `Courier` using the system clock and default options.
    #[must_use]
    pub fn new(keys: KeyPair) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock))
    }

    /// Creates a `Courier` that timestamps events with `clock`.
    #[must_use]
    pub fn with_clock(keys: KeyPair, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            clock,
            envelope: EnvelopeOptions::default(),
            publish_config: PublishConfig::default(),
        }
    }

    /// Replaces the gift-wrap options.
    #[must_use]
    pub fn with_envelope_options(mut self, options: EnvelopeOptions) -> Self {
        self.envelope = options;
        self
    }

    /// Replaces the publish configuration.
    #[must_use]
    pub fn with_publish_config(mut self, config: PublishConfig) -> Self {
        self.publish_config = config;
        self
    }

    /// The identity's public key.
    #[must_use]
    pub const fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    /// Builds and signs a kind 1 text note.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn text_note(&self, text: &str) -> CourierResult<Event> {
        Ok(build_and_sign(
            &self.keys,
            KIND_TEXT_NOTE,
            text,
            Vec::new(),
            self.clock.as_ref(),
        )?)
    }

    /// Builds a gift-wrapped direct message to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage of the envelope fails.
    pub fn direct_message(&self, recipient: &PublicKey, text: &str) -> CourierResult<Event> {
        Ok(giftwrap::wrap_direct_message(
            &self.keys,
            recipient,
            text,
            self.clock.as_ref(),
            &self.envelope,
        )?)
    }

    /// Opens a gift wrap addressed to this identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the wrap is not for this identity, was tampered
    /// with, or is malformed.
    pub fn open_direct_message(&self, gift_wrap: &Event) -> CourierResult<OpenedMessage> {
        Ok(giftwrap::open_direct_message(&self.keys, gift_wrap)?)
    }

    /// Signs a text note and publishes it to every destination.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or `destinations` is empty.
    /// Individual destination failures are reported in the
    /// [`PublishReport`].
    pub async fn publish_text_note(
        &self,
        text: &str,
        destinations: &[Arc<dyn Destination>],
    ) -> CourierResult<PublishReport> {
        let event = self.text_note(text)?;
        log::debug!("Publishing text note {}", event.id);
        Ok(publish(&event, destinations, &self.publish_config).await?)
    }

    /// Wraps a direct message for the `npub` recipient and publishes it.
    ///
    /// # Errors
    ///
    /// Returns an error if `recipient_npub` does not decode, the envelope
    /// cannot be built, or `destinations` is empty.
    pub async fn send_direct_message(
        &self,
        recipient_npub: &str,
        text: &str,
        destinations: &[Arc<dyn Destination>],
    ) -> CourierResult<PublishReport> {
        let recipient = PublicKey::from_npub(recipient_npub)?;
        let event = self.direct_message(&recipient, text)?;
        log::debug!("Publishing gift wrap {}", event.id);
        Ok(publish(&event, destinations, &self.publish_config).await?)
    }
}

impl fmt::Debug for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Courier")
            .field("public_key", &self.keys.public_key())
            .field("envelope", &self.envelope)
            .field("publish_config", &self.publish_config)
            .finish_non_exhaustive()
    }
}
