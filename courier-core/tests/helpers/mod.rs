//! Reusable test helpers for integration tests.
//!
//! Destinations here are in-process stand-ins for relays: each one scripts
//! a delay and an answer so fan-out behavior can be checked without a
//! network.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courier_core::clock::FixedClock;
use courier_core::nostr::{EnvelopeOptions, Event, KeyPair, WrapSigner};
use courier_core::relay::{DeliveryError, Destination};
use courier_core::Courier;

/// Fixed timestamp used across tests (2023-11-14T22:13:20Z).
pub const TEST_TIME: i64 = 1_700_000_000;

/// A destination that records every event it accepts.
#[derive(Default)]
pub struct RecordingDestination {
    id: String,
    received: Mutex<Vec<Event>>,
}

impl RecordingDestination {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Events delivered so far.
    pub fn received(&self) -> Vec<Event> {
        self.received.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Destination for RecordingDestination {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, event: &Event) -> Result<(), DeliveryError> {
        self.received
            .lock()
            .expect("lock poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// A destination that always answers with `error`.
pub struct FailingDestination {
    id: String,
    error: DeliveryError,
}

impl FailingDestination {
    pub fn new(id: &str, error: DeliveryError) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            error,
        })
    }
}

#[async_trait]
impl Destination for FailingDestination {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, _event: &Event) -> Result<(), DeliveryError> {
        Err(self.error.clone())
    }
}

/// A destination that accepts after `delay`.
pub struct SlowDestination {
    id: String,
    delay: Duration,
}

impl SlowDestination {
    pub fn new(id: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            delay,
        })
    }
}

#[async_trait]
impl Destination for SlowDestination {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, _event: &Event) -> Result<(), DeliveryError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Creates a courier with a fresh identity and a clock frozen at
/// [`TEST_TIME`].
pub fn test_courier() -> Courier {
    Courier::with_clock(
        KeyPair::generate().expect("should generate keys"),
        Arc::new(FixedClock(TEST_TIME)),
    )
}

/// Envelope options that sign with the sender and keep the clock time.
pub fn sender_signed_options() -> EnvelopeOptions {
    EnvelopeOptions {
        wrap_signer: WrapSigner::Sender,
        timestamp_jitter: 0,
    }
}
