//! Payload encryption between two identities.
//!
//! - [`ConversationKey`]: symmetric key from ECDH + HKDF-Extract
//! - [`cipher`]: ChaCha20 + HMAC-SHA256 with length padding
//! - [`encrypt_nip44`] / [`decrypt_nip44`]: the same, base64 encoded for use
//!   as event content

use base64::Engine;

pub mod cipher;
mod conversation;
pub mod padding;

pub use conversation::{ConversationKey, CONVERSATION_KEY_SALT};

use crate::nostr::error::{NostrError, Result};

/// Encrypts a UTF-8 string and returns standard base64.
///
/// # Errors
///
/// Returns an error if the plaintext is empty or too long, or if no nonce
/// can be drawn.
pub fn encrypt_nip44(plaintext: &str, conversation_key: &ConversationKey) -> Result<String> {
    let payload = cipher::encrypt(plaintext.as_bytes(), conversation_key)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(payload))
}

/// Decrypts base64 content produced by [`encrypt_nip44`].
///
/// # Errors
///
/// Returns [`NostrError::Format`] for invalid base64, a malformed payload or
/// non-UTF-8 plaintext, and [`NostrError::Authentication`] if the payload was
/// not encrypted under `conversation_key`.
pub fn decrypt_nip44(ciphertext: &str, conversation_key: &ConversationKey) -> Result<String> {
    if ciphertext.starts_with('#') {
        return Err(NostrError::Format("unsupported encryption version".to_string()));
    }

    let payload = base64::engine::general_purpose::STANDARD
        .decode(ciphertext)
        .map_err(|e| NostrError::Format(format!("Base64 decode error: {e}")))?;

    let plaintext = cipher::decrypt(&payload, conversation_key)?;

    String::from_utf8(plaintext)
        .map_err(|e| NostrError::Format(format!("UTF-8 decode error: {e}")))
}
