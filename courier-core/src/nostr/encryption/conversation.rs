//! Conversation keys shared between two identities.
//!
//! The key is `HKDF-Extract(salt = "nip44-v2", ikm = ECDH x-coordinate)`.
//! Because the ECDH point is the same from both sides,
//! `derive(a, B) == derive(b, A)`.

use std::fmt;

use hkdf::Hkdf;
use nostr::secp256k1::{ecdh, Parity};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::nostr::error::{NostrError, Result};
use crate::nostr::keys::{KeyPair, PublicKey};

/// Domain-separation salt for conversation key extraction.
pub const CONVERSATION_KEY_SALT: &[u8] = b"nip44-v2";

/// A 32-byte symmetric key shared by two identities.
///
/// Zeroized on drop; `Debug` never prints the key.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ConversationKey([u8; 32]);

impl ConversationKey {
    /// Derives the conversation key between `keys` and `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyDerivation`] if `peer` is not a valid curve
    /// point.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::encryption::ConversationKey;
    /// use courier_core::nostr::KeyPair;
    ///
    /// let alice = KeyPair::generate().unwrap();
    /// let bob = KeyPair::generate().unwrap();
    ///
    /// let ab = ConversationKey::derive(&alice, &bob.public_key()).unwrap();
    /// let ba = ConversationKey::derive(&bob, &alice.public_key()).unwrap();
    /// assert_eq!(ab, ba);
    /// ```
    pub fn derive(keys: &KeyPair, peer: &PublicKey) -> Result<Self> {
        let point = peer.xonly()?.public_key(Parity::Even);
        let secret_key = keys.secret_key()?;

        let shared_point = Zeroizing::new(ecdh::shared_secret_point(&point, &secret_key));
        let shared_x = &shared_point[..32];

        let (prk, _) = Hkdf::<Sha256>::extract(Some(CONVERSATION_KEY_SALT), shared_x);
        let mut key = [0u8; 32];
        key.copy_from_slice(&prk);
        Ok(Self(key))
    }

    /// Wraps an existing 32-byte key.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PartialEq for ConversationKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for ConversationKey {}

impl fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConversationKey(<redacted>)")
    }
}
