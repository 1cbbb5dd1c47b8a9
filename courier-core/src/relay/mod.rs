//! Publishing signed events to relays.
//!
//! # Architecture
//!
//! ```text
//! Courier
//!     │  &Event, &[Arc<dyn Destination>]
//!     ▼
//! publish (concurrent, per-destination timeout)
//!     │
//!     ├──► RelayDestination ──► nostr-sdk Client ──► relay A
//!     ├──► RelayDestination ──► nostr-sdk Client ──► relay B
//!     └──► ...
//!     │
//!     ▼
//! PublishReport (one outcome per destination)
//! ```
//!
//! Delivery is best-effort: a failing or slow relay is recorded in the
//! report and never aborts the others. Connections are opened and closed
//! by the caller.

mod client;
mod destination;
mod error;
mod fanout;
mod types;

pub use client::{RelayDestination, DEFAULT_CONNECT_TIMEOUT};
pub use destination::Destination;
pub use error::{DeliveryError, RelayError, RelayResult};
pub use fanout::publish;
pub use types::{PublishConfig, PublishOutcome, PublishReport, DEFAULT_PUBLISH_TIMEOUT};
