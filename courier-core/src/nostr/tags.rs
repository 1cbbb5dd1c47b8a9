//! Tag builders for Nostr events.
//!
//! - `p` tag: addresses a public key (gift-wrap recipient)

use crate::nostr::keys::PublicKey;

/// Builder for Nostr event tags.
///
/// # Example
///
/// ```
/// use courier_core::nostr::{KeyPair, TagBuilder};
///
/// let keys = KeyPair::generate().unwrap();
/// let tag = TagBuilder::p_tag(&keys.public_key());
/// assert_eq!(tag[0], "p");
/// assert_eq!(tag[1], keys.pubkey_hex());
/// ```
pub struct TagBuilder;

impl TagBuilder {
    /// Builds the `p` tag naming a public key in hex.
    #[must_use]
    pub fn p_tag(pubkey: &PublicKey) -> Vec<String> {
        vec!["p".to_string(), pubkey.to_hex()]
    }
}
