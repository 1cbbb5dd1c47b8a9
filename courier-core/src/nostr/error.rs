//! Error types for Nostr key, event and envelope operations.

use thiserror::Error;

/// Errors that can occur while handling keys, events and encrypted payloads.
///
/// Every variant names the stage that failed. None of them ever carries
/// secret key material.
#[derive(Error, Debug)]
pub enum NostrError {
    /// A bech32 or hex key encoding could not be decoded.
    #[error("Key decode failed: {0}")]
    KeyDecode(String),

    /// The operating system random source was unavailable.
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    /// Event signing failed.
    #[error("Event signing failed: {0}")]
    Signing(String),

    /// Conversation key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// The payload MAC did not match; the payload was tampered with or
    /// encrypted under a different key.
    #[error("Decryption failed: authentication tag mismatch")]
    Authentication,

    /// An encrypted payload or plaintext violated the length or version rules.
    #[error("Malformed payload: {0}")]
    Format(String),

    /// Serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid event structure or content.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Event signature verification failed.
    #[error("Invalid event signature")]
    InvalidSignature,
}

/// Result type for Nostr operations.
pub type Result<T> = std::result::Result<T, NostrError>;

impl From<hex::FromHexError> for NostrError {
    fn from(e: hex::FromHexError) -> Self {
        Self::InvalidEvent(format!("hex: {e}"))
    }
}
