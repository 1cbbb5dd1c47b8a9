//! Gift-wrapped direct messages.
//!
//! # Envelope Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ Gift Wrap (kind 1059) - PUBLIC                      │
//! │ • Signed by the wrap signer (ephemeral by default)  │
//! │ • Timestamp shifted back by a random offset         │
//! │ • Only reveals: recipient (p-tag)                   │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │ Seal (kind 13) - ENCRYPTED                    │  │
//! │  │ • Plaintext message in content                │  │
//! │  │ • Signed by sender's real key                 │  │
//! │  │ • True timestamp                              │  │
//! │  └───────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The whole signed seal (not just its content) is serialized and encrypted
//! under the conversation key between the wrap signer and the recipient. The
//! recipient reverses this with the wrap's `pubkey`, so both signer policies
//! open the same way.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::nostr::encryption::{decrypt_nip44, encrypt_nip44, ConversationKey};
use crate::nostr::error::{NostrError, Result};
use crate::nostr::event::{build_and_sign, Event, UnsignedEvent, KIND_GIFT_WRAP, KIND_SEAL};
use crate::nostr::keys::{KeyPair, PublicKey};
use crate::nostr::tags::TagBuilder;

/// Default backdating window for gift-wrap timestamps: two days.
pub const DEFAULT_TIMESTAMP_JITTER: u64 = 2 * 24 * 60 * 60;

/// Which key signs (and encrypts) the outer gift wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapSigner {
    /// A fresh single-use keypair per message. The outer signature cannot
    /// be linked to the sender's identity.
    #[default]
    Ephemeral,

    /// The sender's identity key. Relays can see who sent the wrap.
    Sender,
}

/// Options for composing a gift wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeOptions {
    /// Key used for the outer layer.
    pub wrap_signer: WrapSigner,

    /// Upper bound in seconds for backdating the wrap's `created_at`.
    /// Zero keeps the clock time.
    pub timestamp_jitter: u64,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            wrap_signer: WrapSigner::Ephemeral,
            timestamp_jitter: DEFAULT_TIMESTAMP_JITTER,
        }
    }
}

/// A direct message recovered from a gift wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// The sender's real public key (from the verified seal).
    pub sender: PublicKey,

    /// The message text.
    pub content: String,

    /// The seal's `created_at`: when the sender composed the message.
    pub sent_at: i64,

    /// The event ID of the gift wrap.
    pub wrapper_event_id: String,
}

/// Composes a gift-wrapped direct message.
///
/// 1. Seal: kind 13 event with `message` as content, signed by `sender`
/// 2. Serialize the signed seal to JSON
/// 3. Encrypt the JSON under the wrap signer / recipient conversation key
/// 4. Gift wrap: kind 1059 event with the ciphertext and a `p` tag for
///    `recipient`, signed by the wrap signer
///
/// Only the returned gift wrap should be published.
///
/// # Errors
///
/// Any stage failure aborts the composition with that stage's error; no
/// partial envelope is returned. In particular an invalid `recipient` key is
/// [`NostrError::KeyDerivation`].
///
/// # Example
///
/// ```
/// use courier_core::clock::SystemClock;
/// use courier_core::nostr::giftwrap::{open_direct_message, wrap_direct_message, EnvelopeOptions};
/// use courier_core::nostr::KeyPair;
///
/// let alice = KeyPair::generate().unwrap();
/// let bob = KeyPair::generate().unwrap();
///
/// let wrap = wrap_direct_message(&alice, &bob.public_key(), "hi bob", &SystemClock, &EnvelopeOptions::default()).unwrap();
/// let opened = open_direct_message(&bob, &wrap).unwrap();
/// assert_eq!(opened.sender, alice.public_key());
/// assert_eq!(opened.content, "hi bob");
/// ```
pub fn wrap_direct_message(
    sender: &KeyPair,
    recipient: &PublicKey,
    message: &str,
    clock: &dyn Clock,
    options: &EnvelopeOptions,
) -> Result<Event> {
    let seal = build_and_sign(sender, KIND_SEAL, message, Vec::new(), clock)?;
    let seal_json = Zeroizing::new(seal.to_json()?);

    // Never stored; dropped (and zeroized) when this function returns
    let ephemeral;
    let wrap_keys = match options.wrap_signer {
        WrapSigner::Ephemeral => {
            ephemeral = KeyPair::generate()?;
            &ephemeral
        }
        WrapSigner::Sender => sender,
    };

    let conversation_key = ConversationKey::derive(wrap_keys, recipient)?;
    let encrypted = encrypt_nip44(&seal_json, &conversation_key)?;

    let created_at = backdate(clock.now(), options.timestamp_jitter)?;
    UnsignedEvent::new(
        wrap_keys.public_key(),
        created_at,
        KIND_GIFT_WRAP,
        vec![TagBuilder::p_tag(recipient)],
        encrypted,
    )
    .sign(wrap_keys)
}

/// Opens a gift wrap addressed to `recipient`.
///
/// # Errors
///
/// Returns an error if:
/// - the event is not kind 1059 or not addressed to `recipient`
/// - the wrap or the seal fails verification
/// - decryption fails (not intended for this recipient, or tampered)
/// - the decrypted payload is not a kind 13 seal
pub fn open_direct_message(recipient: &KeyPair, gift_wrap: &Event) -> Result<OpenedMessage> {
    if gift_wrap.kind != KIND_GIFT_WRAP {
        return Err(NostrError::InvalidEvent(format!(
            "Event is not a gift wrap (kind {KIND_GIFT_WRAP}), got {}",
            gift_wrap.kind
        )));
    }

    gift_wrap.verify()?;

    let recipient_hex = recipient.pubkey_hex();
    let addressed = gift_wrap.tags.iter().any(|tag| {
        tag.first().map(String::as_str) == Some("p")
            && tag.get(1).map(String::as_str) == Some(recipient_hex.as_str())
    });
    if !addressed {
        return Err(NostrError::InvalidEvent(
            "Gift wrap is not addressed to this recipient".to_string(),
        ));
    }

    let conversation_key = ConversationKey::derive(recipient, &gift_wrap.pubkey)?;
    let seal_json = Zeroizing::new(decrypt_nip44(&gift_wrap.content, &conversation_key)?);
    let seal = Event::from_json(&seal_json)?;

    if seal.kind != KIND_SEAL {
        return Err(NostrError::InvalidEvent(format!(
            "Gift wrap does not contain a kind {KIND_SEAL} seal, got {}",
            seal.kind
        )));
    }
    seal.verify()?;

    Ok(OpenedMessage {
        sender: seal.pubkey,
        content: seal.content,
        sent_at: seal.created_at,
        wrapper_event_id: gift_wrap.id.clone(),
    })
}

/// Shifts `now` back by a random offset in `0..=jitter` seconds.
///
/// Fails with [`NostrError::Entropy`] if the OS random source is
/// unavailable.
fn backdate(now: i64, jitter: u64) -> Result<i64> {
    if jitter == 0 {
        return Ok(now);
    }

    let mut buf = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| NostrError::Entropy(e.to_string()))?;
    let raw = u64::from_le_bytes(buf);
    let offset = jitter.checked_add(1).map_or(raw, |span| raw % span);

    Ok(now.saturating_sub(i64::try_from(offset).unwrap_or(i64::MAX)))
}
