//! Nostr event construction, identity and signatures (NIP-01).
//!
//! - [`UnsignedEvent`]: author, timestamp, kind, tags and content
//! - [`Event`]: the same fields plus the content-addressed `id` and the
//!   author's Schnorr signature `sig`
//!
//! The `id` is the SHA-256 of the canonical serialization
//! `[0, pubkey, created_at, kind, tags, content]` written without
//! insignificant whitespace. Any change to those fields after signing makes
//! [`Event::verify`] fail.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::clock::Clock;
use crate::nostr::error::{NostrError, Result};
use crate::nostr::keys::{KeyPair, PublicKey};

/// Event kind for plain text notes.
pub const KIND_TEXT_NOTE: u16 = 1;

/// Event kind for seals (NIP-59 inner signed layer).
pub const KIND_SEAL: u16 = 13;

/// Event kind for gift wraps (NIP-59 outer layer).
pub const KIND_GIFT_WRAP: u16 = 1059;

/// An event that has not been signed yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnsignedEvent {
    /// Author public key
    pub pubkey: PublicKey,

    /// Unix timestamp in seconds
    pub created_at: i64,

    /// Event kind
    pub kind: u16,

    /// Event tags, each an ordered list of strings
    pub tags: Vec<Vec<String>>,

    /// Arbitrary content
    pub content: String,
}

impl UnsignedEvent {
    /// Creates an unsigned event.
    #[must_use]
    pub fn new(
        pubkey: PublicKey,
        created_at: i64,
        kind: u16,
        tags: Vec<Vec<String>>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            pubkey,
            created_at,
            kind,
            tags,
            content: content.into(),
        }
    }

    /// Returns the canonical serialization used as the id pre-image.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn canonical_json(&self) -> Result<String> {
        canonical_json(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        )
    }

    /// Computes the event id.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn compute_id(&self) -> Result<[u8; 32]> {
        self.canonical_json().map(|json| sha256(&json))
    }

    /// Signs the event with `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::Signing`] if `keys` is not the event's author or
    /// the signature cannot be produced.
    pub fn sign(self, keys: &KeyPair) -> Result<Event> {
        if self.pubkey != keys.public_key() {
            return Err(NostrError::Signing(
                "signer does not match event author".to_string(),
            ));
        }

        let id = self.compute_id()?;
        let sig = keys.sign(&id)?;

        Ok(Event {
            id: hex::encode(id),
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: hex::encode(sig),
        })
    }
}

/// A signed Nostr event.
///
/// Serializes to the NIP-01 wire object:
///
/// ```json
/// {
///   "id": "...",           // SHA256 of the canonical serialization
///   "pubkey": "...",       // author public key
///   "created_at": 123456,
///   "kind": 1,
///   "tags": [["p", "..."]],
///   "content": "...",
///   "sig": "..."           // Schnorr signature over id
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Event ID (32-byte SHA256 hash, hex-encoded)
    pub id: String,

    /// Author public key (32 bytes, hex-encoded)
    pub pubkey: PublicKey,

    /// Unix timestamp in seconds
    pub created_at: i64,

    /// Event kind
    pub kind: u16,

    /// Event tags
    pub tags: Vec<Vec<String>>,

    /// Event content
    pub content: String,

    /// Schnorr signature (64 bytes, hex-encoded)
    pub sig: String,
}

/// Builds an event stamped by `clock` and signs it with `keys`.
///
/// Identical `(author, created_at, kind, tags, content)` always produce the
/// same id. Signatures use fresh auxiliary randomness, so the `sig` differs
/// between calls while both verify.
///
/// # Errors
///
/// Returns an error if serialization or signing fails.
///
/// # Example
///
/// ```
/// use courier_core::clock::FixedClock;
/// use courier_core::nostr::{build_and_sign, KeyPair, KIND_TEXT_NOTE};
///
/// let keys = KeyPair::generate().unwrap();
/// let event = build_and_sign(&keys, KIND_TEXT_NOTE, "hello", vec![], &FixedClock(1_700_000_000)).unwrap();
/// assert!(event.verify().is_ok());
/// ```
pub fn build_and_sign(
    keys: &KeyPair,
    kind: u16,
    content: &str,
    tags: Vec<Vec<String>>,
    clock: &dyn Clock,
) -> Result<Event> {
    UnsignedEvent::new(keys.public_key(), clock.now(), kind, tags, content).sign(keys)
}

impl Event {
    /// Returns the id as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not 32 bytes of hex.
    pub fn id_bytes(&self) -> Result<[u8; 32]> {
        hex::decode(&self.id)?
            .try_into()
            .map_err(|_| NostrError::InvalidEvent("Invalid ID length".to_string()))
    }

    /// Returns the unsigned portion of this event.
    #[must_use]
    pub fn unsigned(&self) -> UnsignedEvent {
        UnsignedEvent::new(
            self.pubkey,
            self.created_at,
            self.kind,
            self.tags.clone(),
            self.content.clone(),
        )
    }

    /// Verifies the id and signature.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidEvent`] if the id does not match the
    /// event fields or is malformed, and [`NostrError::InvalidSignature`] if
    /// the signature does not verify against `pubkey`.
    pub fn verify(&self) -> Result<()> {
        let claimed_id = self.id_bytes()?;
        let sig_bytes: [u8; 64] = hex::decode(&self.sig)?
            .try_into()
            .map_err(|_| NostrError::InvalidEvent("Invalid signature length".to_string()))?;

        // Constant-time comparison to prevent timing attacks
        let calculated_id = self.unsigned().compute_id()?;
        if !bool::from(calculated_id[..].ct_eq(&claimed_id[..])) {
            return Err(NostrError::InvalidEvent("Event ID mismatch".to_string()));
        }

        self.pubkey.verify(&claimed_id, &sig_bytes)
    }

    /// Returns the first value of the first tag named `name`.
    #[must_use]
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some(name))
            .and_then(|tag| tag.get(1).map(String::as_str))
    }

    /// Serializes this event to JSON for transmission.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(NostrError::from)
    }

    /// Deserializes a signed event from JSON without verifying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(NostrError::from)
    }
}

/// Per NIP-01, serialize as: `[0, pubkey, created_at, kind, tags, content]`.
fn canonical_json(
    pubkey: &PublicKey,
    created_at: i64,
    kind: u16,
    tags: &[Vec<String>],
    content: &str,
) -> Result<String> {
    serde_json::to_string(&(0, pubkey.to_hex(), created_at, kind, tags, content))
        .map_err(NostrError::from)
}

fn sha256(data: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const CREATED_AT: i64 = 1_700_000_000;

    fn sample_event(keys: &KeyPair) -> Event {
        build_and_sign(
            keys,
            KIND_TEXT_NOTE,
            "hello",
            vec![],
            &FixedClock(CREATED_AT),
        )
        .unwrap()
    }

    #[test]
    fn canonical_json_has_no_whitespace() {
        let keys = KeyPair::generate().unwrap();
        let event = UnsignedEvent::new(
            keys.public_key(),
            CREATED_AT,
            KIND_TEXT_NOTE,
            vec![vec!["p".to_string(), "ab".to_string()]],
            "hi there",
        );

        assert_eq!(
            event.canonical_json().unwrap(),
            format!(
                "[0,\"{}\",1700000000,1,[[\"p\",\"ab\"]],\"hi there\"]",
                keys.pubkey_hex()
            )
        );
    }

    #[test]
    fn canonical_json_escapes_like_nip01() {
        let keys = KeyPair::generate().unwrap();
        let event = UnsignedEvent::new(
            keys.public_key(),
            0,
            KIND_TEXT_NOTE,
            vec![],
            "line\n\"quoted\"\\ é",
        );

        let json = event.canonical_json().unwrap();
        assert!(json.ends_with(r#","line\n\"quoted\"\\ é"]"#));
    }

    #[test]
    fn id_is_hash_of_canonical_serialization() {
        let keys = KeyPair::generate().unwrap();
        let event = sample_event(&keys);

        let preimage = format!(
            "[0,\"{}\",1700000000,1,[],\"hello\"]",
            keys.pubkey_hex()
        );
        assert_eq!(event.id, hex::encode(Sha256::digest(preimage.as_bytes())));
        assert_eq!(event.id.len(), 64);
        assert_eq!(event.sig.len(), 128);
        assert_eq!(event.created_at, CREATED_AT);
    }

    #[test]
    fn signature_verifies() {
        let keys = KeyPair::generate().unwrap();
        let event = sample_event(&keys);
        assert!(event.verify().is_ok());
    }

    #[test]
    fn resigning_same_tuple_keeps_id() {
        let keys = KeyPair::generate().unwrap();
        let first = sample_event(&keys);
        let second = sample_event(&keys);

        assert_eq!(first.id, second.id);
        assert_ne!(first.sig, second.sig);
        assert!(first.verify().is_ok());
        assert!(second.verify().is_ok());
    }

    #[test]
    fn tampered_content_fails_verification() {
        let keys = KeyPair::generate().unwrap();
        let mut event = sample_event(&keys);
        event.content = "goodbye".to_string();

        assert!(matches!(event.verify(), Err(NostrError::InvalidEvent(_))));
    }

    #[test]
    fn tampered_fields_fail_verification() {
        let keys = KeyPair::generate().unwrap();
        let original = sample_event(&keys);

        let mut event = original.clone();
        event.created_at += 1;
        assert!(event.verify().is_err());

        let mut event = original.clone();
        event.kind = KIND_SEAL;
        assert!(event.verify().is_err());

        let mut event = original.clone();
        event.tags.push(vec!["t".to_string(), "x".to_string()]);
        assert!(event.verify().is_err());

        let mut event = original;
        event.pubkey = KeyPair::generate().unwrap().public_key();
        assert!(event.verify().is_err());
    }

    #[test]
    fn recomputed_id_with_wrong_signature_fails() {
        let keys = KeyPair::generate().unwrap();
        let other = sample_event(&KeyPair::generate().unwrap());
        let mut event = sample_event(&keys);
        event.sig = other.sig;

        assert!(matches!(event.verify(), Err(NostrError::InvalidSignature)));
    }

    #[test]
    fn sign_rejects_foreign_author() {
        let author = KeyPair::generate().unwrap();
        let signer = KeyPair::generate().unwrap();
        let unsigned =
            UnsignedEvent::new(author.public_key(), CREATED_AT, KIND_TEXT_NOTE, vec![], "x");

        assert!(matches!(
            unsigned.sign(&signer),
            Err(NostrError::Signing(_))
        ));
    }

    #[test]
    fn json_roundtrip_preserves_verification() {
        let keys = KeyPair::generate().unwrap();
        let event = sample_event(&keys);

        let json = event.to_json().unwrap();
        let recovered = Event::from_json(&json).unwrap();

        assert_eq!(event, recovered);
        assert!(recovered.verify().is_ok());
    }

    #[test]
    fn json_uses_nip01_field_names() {
        let keys = KeyPair::generate().unwrap();
        let event = sample_event(&keys);
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        for field in ["id", "pubkey", "created_at", "kind", "tags", "content", "sig"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["pubkey"], keys.pubkey_hex());
    }

    #[test]
    fn nostr_crate_accepts_signed_event() {
        use nostr::JsonUtil;

        let keys = KeyPair::generate().unwrap();
        let event = build_and_sign(
            &keys,
            KIND_TEXT_NOTE,
            "interop ✓",
            vec![vec!["t".to_string(), "courier".to_string()]],
            &FixedClock(CREATED_AT),
        )
        .unwrap();

        let theirs = nostr::Event::from_json(event.to_json().unwrap()).unwrap();
        assert!(theirs.verify().is_ok());
        assert_eq!(theirs.id.to_hex(), event.id);
    }

    #[test]
    fn tag_value_finds_first_match() {
        let keys = KeyPair::generate().unwrap();
        let event = build_and_sign(
            &keys,
            KIND_GIFT_WRAP,
            "",
            vec![
                vec!["p".to_string(), "first".to_string()],
                vec!["p".to_string(), "second".to_string()],
            ],
            &FixedClock(CREATED_AT),
        )
        .unwrap();

        assert_eq!(event.tag_value("p"), Some("first"));
        assert_eq!(event.tag_value("e"), None);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            Event::from_json("{not json"),
            Err(NostrError::Serialization(_))
        ));
    }
}
