//! Courier Core Library
//!
//! Signed Nostr notes and gift-wrapped direct messages, published
//! best-effort to many relays at once.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod clock;
mod error;
pub mod nostr;
pub mod relay;

pub use api::Courier;
pub use error::{CourierError, CourierResult};
