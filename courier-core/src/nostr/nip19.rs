//! NIP-19 bech32 encodings for 32-byte keys (`nsec`, `npub`).
//!
//! Only the bare key forms are supported; TLV entities such as `nprofile`
//! are not needed for publishing.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use zeroize::Zeroize;

use crate::nostr::error::{NostrError, Result};

/// Human-readable prefix for secret keys.
pub const NSEC_HRP: Hrp = Hrp::parse_unchecked("nsec");

/// Human-readable prefix for public keys.
pub const NPUB_HRP: Hrp = Hrp::parse_unchecked("npub");

/// Encodes 32 key bytes as bech32 under the given prefix.
pub(crate) fn encode_key(hrp: Hrp, bytes: &[u8; 32]) -> Result<String> {
    bech32::encode::<Bech32>(hrp, bytes).map_err(|e| NostrError::KeyDecode(e.to_string()))
}

/// Decodes a bech32 key string, requiring `expected` as its prefix and
/// exactly 32 bytes of payload after regrouping from 5-bit groups.
///
/// Only the original bech32 checksum is accepted (not bech32m), and the
/// bits left over after regrouping must be zero, so every key has exactly
/// one valid encoding.
///
/// Error messages never echo the input, which may be a secret key.
pub(crate) fn decode_key(expected: Hrp, encoded: &str) -> Result<[u8; 32]> {
    let checked = CheckedHrpstring::new::<Bech32>(encoded.trim())
        .map_err(|e| NostrError::KeyDecode(format!("invalid bech32 string: {e}")))?;

    let hrp = checked.hrp();
    if hrp != expected {
        return Err(NostrError::KeyDecode(format!(
            "expected '{expected}' prefix, got '{hrp}'"
        )));
    }

    checked
        .validate_segwit_padding()
        .map_err(|e| NostrError::KeyDecode(format!("invalid padding: {e}")))?;

    let mut data: Vec<u8> = checked.byte_iter().collect();

    if data.len() != 32 {
        let len = data.len();
        data.zeroize();
        return Err(NostrError::KeyDecode(format!(
            "expected 32-byte payload, got {len} bytes"
        )));
    }

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data);
    data.zeroize();
    Ok(bytes)
}
