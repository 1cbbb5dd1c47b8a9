//! Identity keys for signing and addressing Nostr events.
//!
//! A [`KeyPair`] is the process's long-lived identity (nsec/npub). A
//! [`PublicKey`] identifies a peer, for example the recipient of a direct
//! message.
//!
//! # Security
//!
//! - Secret bytes are zeroized on drop via [`ZeroizeOnDrop`]
//! - Temporary copies are wrapped in [`Zeroizing`]
//! - Debug output never includes secret material

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use nostr::secp256k1::{
    schnorr::Signature, Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::nostr::error::{NostrError, Result};
use crate::nostr::nip19::{self, NPUB_HRP, NSEC_HRP};

/// Global secp256k1 context for cryptographic operations.
///
/// Creating a `Secp256k1` context precomputes tables for signing and
/// verification, so one context is shared by the whole process.
pub static SECP: LazyLock<Secp256k1<nostr::secp256k1::All>> = LazyLock::new(Secp256k1::new);

/// Upper bound on redraws in [`KeyPair::generate`]. A uniformly random
/// 32-byte string is an invalid scalar with probability below 2^-127.
const MAX_GENERATE_ATTEMPTS: usize = 16;

/// A 32-byte BIP-340 x-only public key.
///
/// Curve membership is checked when the key is used for verification or key
/// agreement, not at construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wraps raw public key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character hex public key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyDecode`] if the string is not 32 bytes of hex.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode(hex_str)
            .map_err(|e| NostrError::KeyDecode(format!("invalid hex public key: {e}")))?
            .try_into()
            .map_err(|_| NostrError::KeyDecode("public key must be 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }

    /// Parses an `npub` bech32 public key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyDecode`] on a wrong prefix, a bad checksum or
    /// a payload that is not 32 bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::{KeyPair, PublicKey};
    ///
    /// let keys = KeyPair::generate().unwrap();
    /// let npub = keys.public_key().to_npub().unwrap();
    /// assert_eq!(PublicKey::from_npub(&npub).unwrap(), keys.public_key());
    /// ```
    pub fn from_npub(npub: &str) -> Result<Self> {
        nip19::decode_key(NPUB_HRP, npub).map(Self)
    }

    /// Returns the lowercase hex encoding (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the `npub` bech32 encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if bech32 encoding fails.
    pub fn to_npub(&self) -> Result<String> {
        nip19::encode_key(NPUB_HRP, &self.0)
    }

    /// Returns the raw public key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lifts the bytes to a curve point.
    pub(crate) fn xonly(&self) -> Result<XOnlyPublicKey> {
        XOnlyPublicKey::from_slice(&self.0)
            .map_err(|e| NostrError::KeyDerivation(format!("public key is not on the curve: {e}")))
    }

    /// Verifies a BIP-340 signature over a 32-byte digest.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidSignature`] if the key is not a curve
    /// point or the signature does not verify.
    pub fn verify(&self, digest: &[u8; 32], signature: &[u8; 64]) -> Result<()> {
        let pubkey = self.xonly().map_err(|_| NostrError::InvalidSignature)?;
        let signature =
            Signature::from_slice(signature).map_err(|_| NostrError::InvalidSignature)?;
        let message = Message::from_digest(*digest);
        SECP.verify_schnorr(&signature, &message, &pubkey)
            .map_err(|_| NostrError::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = NostrError;

    /// Accepts either `npub1...` or 64-character hex.
    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("npub1") {
            Self::from_npub(s)
        } else {
            Self::from_hex(s)
        }
    }
}

impl TryFrom<String> for PublicKey {
    type Error = NostrError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(value: PublicKey) -> Self {
        value.to_hex()
    }
}

/// An identity keypair.
///
/// The secret is held for the lifetime of the process and wiped on drop.
///
/// # Example
///
/// ```
/// use courier_core::nostr::KeyPair;
///
/// let keys = KeyPair::generate().unwrap();
/// let nsec = keys.to_nsec().unwrap();
///
/// let restored = KeyPair::from_nsec(&nsec).unwrap();
/// assert_eq!(keys.public_key(), restored.public_key());
/// ```
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    /// The secret key bytes (zeroized on drop).
    secret_bytes: [u8; 32],

    /// Cached public key bytes (not sensitive, skip zeroization).
    #[zeroize(skip)]
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random keypair from the operating system RNG.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::Entropy`] if the random source is unavailable.
    pub fn generate() -> Result<Self> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let mut candidate = Zeroizing::new([0u8; 32]);
            OsRng
                .try_fill_bytes(&mut candidate[..])
                .map_err(|e| NostrError::Entropy(e.to_string()))?;

            if let Ok(keys) = Self::from_secret_bytes(*candidate) {
                return Ok(keys);
            }
        }

        Err(NostrError::Entropy(
            "random source produced no valid secret key".to_string(),
        ))
    }

    /// Creates a keypair from raw secret key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyDecode`] if the bytes are zero or not below
    /// the secp256k1 group order.
    pub fn from_secret_bytes(secret_bytes: [u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(&secret_bytes)
            .map_err(|_| NostrError::KeyDecode("secret key is out of range".to_string()))?;

        let keypair = Keypair::from_secret_key(&SECP, &secret_key);
        let (public_key, _parity) = keypair.x_only_public_key();

        Ok(Self {
            secret_bytes,
            public_key: PublicKey(public_key.serialize()),
        })
    }

    /// Imports a keypair from an `nsec` (NIP-19 bech32-encoded secret key).
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyDecode`] if the prefix is not `nsec`, the
    /// checksum is invalid, or the payload is not a valid 32-byte secret.
    pub fn from_nsec(nsec: &str) -> Result<Self> {
        let secret = Zeroizing::new(nip19::decode_key(NSEC_HRP, nsec)?);
        Self::from_secret_bytes(*secret)
    }

    /// Exports the secret key as `nsec`.
    ///
    /// # Security Warning
    ///
    /// This exposes the secret key. Only use for user-initiated backup.
    ///
    /// # Errors
    ///
    /// Returns an error if bech32 encoding fails.
    pub fn to_nsec(&self) -> Result<String> {
        nip19::encode_key(NSEC_HRP, &self.secret_bytes)
    }

    /// Returns the public half.
    #[must_use]
    pub const fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Returns the public key as a 64-character hex string.
    #[must_use]
    pub fn pubkey_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Signs a 32-byte digest with BIP-340 Schnorr.
    ///
    /// Auxiliary randomness is drawn per signature, so two signatures over
    /// the same digest differ but both verify.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::Signing`] if the stored secret cannot be loaded.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<[u8; 64]> {
        let keypair = self.secp_keypair().map_err(NostrError::Signing)?;
        let message = Message::from_digest(*digest);
        let signature = SECP.sign_schnorr(&message, &keypair);
        Ok(signature.serialize())
    }

    /// Returns the secret as a `secp256k1` key for key agreement.
    pub(crate) fn secret_key(&self) -> Result<SecretKey> {
        let secret_copy = Zeroizing::new(self.secret_bytes);
        SecretKey::from_slice(&secret_copy[..])
            .map_err(|_| NostrError::KeyDerivation("stored secret key is invalid".to_string()))
    }

    fn secp_keypair(&self) -> std::result::Result<Keypair, String> {
        let secret_copy = Zeroizing::new(self.secret_bytes);
        let secret_key = SecretKey::from_slice(&secret_copy[..])
            .map_err(|_| "stored secret key is invalid".to_string())?;
        Ok(Keypair::from_secret_key(&SECP, &secret_key))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret key
        f.debug_struct("KeyPair")
            .field("pubkey", &self.pubkey_hex())
            .finish()
    }
}
