//! Authenticated encryption of payloads under a conversation key.
//!
//! Payload layout (NIP-44 version 2):
//!
//! ```text
//! version (1) || nonce (32) || ChaCha20(padded plaintext) || HMAC-SHA256 (32)
//! ```
//!
//! Per-message keys come from `HKDF-Expand(conversation_key, info = nonce)`,
//! split into a ChaCha20 key, a ChaCha20 nonce and an HMAC key. The MAC
//! covers `nonce || ciphertext` and is checked in constant time before any
//! byte is decrypted.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::conversation::ConversationKey;
use super::padding;
use crate::nostr::error::{NostrError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Payload format version.
pub const VERSION: u8 = 2;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 32;

/// MAC length in bytes.
pub const MAC_LEN: usize = 32;

/// Shortest valid payload: one-byte plaintext in the smallest bucket.
pub const MIN_PAYLOAD_LEN: usize = 1 + NONCE_LEN + padding::LENGTH_PREFIX_SIZE + 32 + MAC_LEN;

/// Longest valid payload: maximum plaintext in the largest bucket.
pub const MAX_PAYLOAD_LEN: usize =
    1 + NONCE_LEN + padding::LENGTH_PREFIX_SIZE + 65_536 + MAC_LEN;

/// Per-message keys expanded from the conversation key and nonce.
#[derive(Zeroize, ZeroizeOnDrop)]
struct MessageKeys {
    chacha_key: [u8; 32],
    chacha_nonce: [u8; 12],
    hmac_key: [u8; 32],
}

impl MessageKeys {
    fn expand(key: &ConversationKey, nonce: &[u8; NONCE_LEN]) -> Result<Self> {
        let hkdf = Hkdf::<Sha256>::from_prk(key.as_bytes())
            .map_err(|e| NostrError::KeyDerivation(e.to_string()))?;

        let mut okm = [0u8; 76];
        hkdf.expand(nonce, &mut okm)
            .map_err(|e| NostrError::KeyDerivation(e.to_string()))?;

        let mut keys = Self {
            chacha_key: [0u8; 32],
            chacha_nonce: [0u8; 12],
            hmac_key: [0u8; 32],
        };
        keys.chacha_key.copy_from_slice(&okm[..32]);
        keys.chacha_nonce.copy_from_slice(&okm[32..44]);
        keys.hmac_key.copy_from_slice(&okm[44..]);
        okm.zeroize();

        Ok(keys)
    }

    fn mac(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.hmac_key)
            .map_err(|e| NostrError::KeyDerivation(e.to_string()))?;
        mac.update(nonce);
        mac.update(ciphertext);
        Ok(mac)
    }

    fn apply_keystream(&self, buf: &mut [u8]) {
        let mut cipher = ChaCha20::new(&self.chacha_key.into(), &self.chacha_nonce.into());
        cipher.apply_keystream(buf);
    }
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`NostrError::Format`] if the plaintext is empty or longer than
/// 65535 bytes, and [`NostrError::Entropy`] if no nonce can be drawn.
pub fn encrypt(plaintext: &[u8], key: &ConversationKey) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| NostrError::Entropy(e.to_string()))?;
    encrypt_with_nonce(plaintext, key, &nonce)
}

/// Encrypts `plaintext` under `key` with a caller-supplied nonce.
///
/// Reusing a nonce under the same key breaks confidentiality; this entry
/// point exists for deterministic test vectors.
///
/// # Errors
///
/// Returns [`NostrError::Format`] if the plaintext length is out of range.
pub fn encrypt_with_nonce(
    plaintext: &[u8],
    key: &ConversationKey,
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let keys = MessageKeys::expand(key, nonce)?;

    let mut padded = padding::pad(plaintext)?;
    keys.apply_keystream(&mut padded);

    let tag = keys.mac(nonce, &padded)?.finalize().into_bytes();

    let mut payload = Vec::with_capacity(1 + NONCE_LEN + padded.len() + MAC_LEN);
    payload.push(VERSION);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&padded);
    payload.extend_from_slice(&tag);
    Ok(payload)
}

/// Authenticates and decrypts a payload produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`NostrError::Format`] for an unknown version or out-of-range
/// length, and [`NostrError::Authentication`] if the MAC does not match.
/// Nothing is decrypted unless the MAC matches.
pub fn decrypt(payload: &[u8], key: &ConversationKey) -> Result<Vec<u8>> {
    let Some(&version) = payload.first() else {
        return Err(NostrError::Format("empty payload".to_string()));
    };
    if version != VERSION {
        return Err(NostrError::Format(format!("unknown version {version}")));
    }
    if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&payload.len()) {
        return Err(NostrError::Format(format!(
            "payload length {} outside {MIN_PAYLOAD_LEN}..={MAX_PAYLOAD_LEN}",
            payload.len()
        )));
    }

    let nonce: [u8; NONCE_LEN] = payload[1..=NONCE_LEN]
        .try_into()
        .map_err(|_| NostrError::Format("truncated nonce".to_string()))?;
    let mac_start = payload.len() - MAC_LEN;
    let ciphertext = &payload[1 + NONCE_LEN..mac_start];
    let tag = &payload[mac_start..];

    let keys = MessageKeys::expand(key, &nonce)?;
    keys.mac(&nonce, ciphertext)?
        .verify_slice(tag)
        .map_err(|_| NostrError::Authentication)?;

    let mut padded = zeroize::Zeroizing::new(ciphertext.to_vec());
    keys.apply_keystream(&mut padded);
    padding::unpad(&padded)
}
