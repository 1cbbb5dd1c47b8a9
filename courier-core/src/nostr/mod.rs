//! Nostr event construction, signing and encrypted direct messages.
//!
//! # Architecture
//!
//! ```text
//! Public note:
//!   text → UnsignedEvent (kind 1) → sign → Event
//!
//! Direct message:
//!   text → Seal (kind 13, signed by sender)
//!              ↓ JSON
//!          NIP-44 v2 encrypt (wrap signer ⇄ recipient conversation key)
//!              ↓ base64
//!          Gift wrap (kind 1059, p-tag recipient) → sign → Event
//! ```
//!
//! # Security
//!
//! - Secret keys are zeroized on drop and never logged
//! - Gift wraps are signed by a fresh ephemeral key by default
//! - Encryption is authenticated; tampering is detected before decryption
//!
//! # Example
//!
//! ```
//! use courier_core::clock::FixedClock;
//! use courier_core::nostr::{build_and_sign, KeyPair, KIND_TEXT_NOTE};
//!
//! let keys = KeyPair::generate().unwrap();
//! let event = build_and_sign(&keys, KIND_TEXT_NOTE, "hello", vec![], &FixedClock(1_700_000_000)).unwrap();
//! assert!(event.verify().is_ok());
//! ```

mod error;
mod event;
mod keys;
mod nip19;
mod tags;

pub mod encryption;
pub mod giftwrap;

pub use error::{NostrError, Result};
pub use event::{build_and_sign, Event, UnsignedEvent, KIND_GIFT_WRAP, KIND_SEAL, KIND_TEXT_NOTE};
pub use giftwrap::{
    open_direct_message, wrap_direct_message, EnvelopeOptions, OpenedMessage, WrapSigner,
};
pub use keys::{KeyPair, PublicKey, SECP};
pub use nip19::{NPUB_HRP, NSEC_HRP};
pub use tags::TagBuilder;
