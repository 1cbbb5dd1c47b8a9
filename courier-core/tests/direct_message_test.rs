//! Integration tests for gift-wrapped direct messages.
//!
//! Exercises the full envelope: compose on one side, reverse it on the
//! other, both through the high-level API and step by step.

mod helpers;

use courier_core::clock::FixedClock;
use courier_core::nostr::encryption::{decrypt_nip44, ConversationKey};
use courier_core::nostr::giftwrap::{open_direct_message, wrap_direct_message, DEFAULT_TIMESTAMP_JITTER};
use courier_core::nostr::{EnvelopeOptions, Event, KeyPair, KIND_GIFT_WRAP, KIND_SEAL};
use courier_core::{Courier, CourierError};
use helpers::{sender_signed_options, test_courier, TEST_TIME};

fn keys() -> KeyPair {
    KeyPair::generate().expect("should generate keys")
}

#[test]
fn envelope_reversal_recovers_message_and_sender() {
    let alice = keys();
    let bob = keys();

    let wrap = wrap_direct_message(
        &alice,
        &bob.public_key(),
        "the package is at the usual place",
        &FixedClock(TEST_TIME),
        &EnvelopeOptions::default(),
    )
    .expect("should wrap");

    // Reverse by hand: derive key, decrypt, deserialize seal, verify seal
    assert!(wrap.verify().is_ok());
    let key = ConversationKey::derive(&bob, &wrap.pubkey).expect("should derive");
    let seal_json = decrypt_nip44(&wrap.content, &key).expect("should decrypt");
    let seal = Event::from_json(&seal_json).expect("should parse seal");

    assert_eq!(seal.kind, KIND_SEAL);
    assert!(seal.verify().is_ok());
    assert_eq!(seal.pubkey, alice.public_key());
    assert_eq!(seal.content, "the package is at the usual place");
    assert_eq!(seal.created_at, TEST_TIME);
    assert!(seal.tags.is_empty());
}

#[test]
fn sender_signed_envelope_reverses_the_same_way() {
    let alice = keys();
    let bob = keys();

    let wrap = wrap_direct_message(
        &alice,
        &bob.public_key(),
        "hello",
        &FixedClock(TEST_TIME),
        &sender_signed_options(),
    )
    .expect("should wrap");

    assert_eq!(wrap.pubkey, alice.public_key());
    let opened = open_direct_message(&bob, &wrap).expect("should open");
    assert_eq!(opened.sender, alice.public_key());
    assert_eq!(opened.content, "hello");
}

#[test]
fn gift_wrap_shape() {
    let alice = keys();
    let bob = keys();

    let wrap = wrap_direct_message(
        &alice,
        &bob.public_key(),
        "hello",
        &FixedClock(TEST_TIME),
        &EnvelopeOptions::default(),
    )
    .expect("should wrap");

    assert_eq!(wrap.kind, KIND_GIFT_WRAP);
    assert_eq!(wrap.tags, vec![vec!["p".to_string(), bob.pubkey_hex()]]);
    assert_eq!(wrap.tag_value("p"), Some(bob.pubkey_hex().as_str()));
    assert_ne!(wrap.pubkey, alice.public_key());
    assert!(wrap.created_at <= TEST_TIME);
    assert!(wrap.created_at >= TEST_TIME - i64::try_from(DEFAULT_TIMESTAMP_JITTER).unwrap());
}

#[test]
fn third_party_cannot_open() {
    let alice = keys();
    let bob = keys();
    let eve = keys();

    let wrap = wrap_direct_message(
        &alice,
        &bob.public_key(),
        "secret",
        &FixedClock(TEST_TIME),
        &EnvelopeOptions::default(),
    )
    .expect("should wrap");

    assert!(open_direct_message(&eve, &wrap).is_err());

    // Even ignoring the p tag, eve's conversation key does not authenticate
    let key = ConversationKey::derive(&eve, &wrap.pubkey).expect("should derive");
    assert!(decrypt_nip44(&wrap.content, &key).is_err());
}

#[test]
fn nostr_crate_decrypts_our_gift_wrap() {
    let alice = keys();
    let bob = keys();

    let wrap = wrap_direct_message(
        &alice,
        &bob.public_key(),
        "interop",
        &FixedClock(TEST_TIME),
        &EnvelopeOptions::default(),
    )
    .expect("should wrap");

    let bob_keys = nostr::Keys::parse(&bob.to_nsec().expect("nsec")).expect("nostr keys");
    let wrap_author = nostr::PublicKey::from_hex(&wrap.pubkey.to_hex()).expect("pubkey");
    let seal_json = nostr::nips::nip44::decrypt(bob_keys.secret_key(), &wrap_author, &wrap.content)
        .expect("nostr should decrypt");

    let seal = Event::from_json(&seal_json).expect("should parse seal");
    assert_eq!(seal.content, "interop");
    assert_eq!(seal.pubkey, alice.public_key());
}

#[test]
fn courier_round_trip_through_recording_destination() {
    let alice = test_courier();
    let bob = test_courier();

    let wrap = alice
        .direct_message(&bob.public_key(), "via courier")
        .expect("should wrap");
    let opened = bob.open_direct_message(&wrap).expect("should open");

    assert_eq!(opened.sender, alice.public_key());
    assert_eq!(opened.content, "via courier");
    assert_eq!(opened.sent_at, TEST_TIME);
    assert_eq!(opened.wrapper_event_id, wrap.id);
}

#[test]
fn courier_open_reports_nostr_error() {
    let alice = test_courier();
    let bob = test_courier();
    let eve: Courier = test_courier();

    let wrap = alice
        .direct_message(&bob.public_key(), "not for eve")
        .expect("should wrap");

    assert!(matches!(
        eve.open_direct_message(&wrap),
        Err(CourierError::Nostr(_))
    ));
}
