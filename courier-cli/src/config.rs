//! Built-in defaults for relays and timeouts.

use std::time::Duration;

/// Relays used when no `--relay` is given.
pub const DEFAULT_RELAYS: [&str; 4] = [
    "wss://relay.damus.io",
    "wss://nos.lol",
    "wss://relay.snort.social",
    "wss://nostr.wine",
];

/// Default for `--timeout`, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Returns `relays`, or the defaults when it is empty.
pub fn relays_or_default(relays: &[String]) -> Vec<String> {
    if relays.is_empty() {
        DEFAULT_RELAYS.iter().map(ToString::to_string).collect()
    } else {
        relays.to_vec()
    }
}

/// Converts the `--timeout` value, treating 0 as the default.
pub const fn timeout_from_secs(secs: u64) -> Duration {
    if secs == 0 {
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    } else {
        Duration::from_secs(secs)
    }
}
