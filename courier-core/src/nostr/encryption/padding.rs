//! Length padding for encrypted payloads.
//!
//! Plaintexts are padded to a bucket boundary before encryption so the
//! ciphertext length only reveals the bucket, not the exact message size.
//!
//! ## Bucket table
//!
//! | Plaintext length | Padded to                          |
//! |------------------|------------------------------------|
//! | 1..=32           | 32                                 |
//! | 33..=256         | next multiple of 32                |
//! | > 256            | next multiple of 1/8 of the next power of two |
//!
//! The padded body is `u16 big-endian length || plaintext || zeros`.

use zeroize::Zeroizing;

use crate::nostr::error::{NostrError, Result};

/// Smallest accepted plaintext length in bytes.
pub const MIN_PLAINTEXT_LEN: usize = 1;

/// Largest accepted plaintext length in bytes.
pub const MAX_PLAINTEXT_LEN: usize = 65_535;

/// Size of the explicit length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Smallest padding bucket.
const MIN_BUCKET: usize = 32;

/// Returns the padded length (without prefix) for a plaintext of `len` bytes.
///
/// # Example
///
/// ```
/// use courier_core::nostr::encryption::padding::padded_len;
///
/// assert_eq!(padded_len(1), 32);
/// assert_eq!(padded_len(33), 64);
/// assert_eq!(padded_len(257), 320);
/// ```
#[must_use]
pub const fn padded_len(len: usize) -> usize {
    if len <= MIN_BUCKET {
        return MIN_BUCKET;
    }
    let next_power = 1usize << (usize::BITS - (len - 1).leading_zeros());
    let chunk = if next_power <= 256 {
        MIN_BUCKET
    } else {
        next_power / 8
    };
    chunk * ((len - 1) / chunk + 1)
}

/// Pads a plaintext into its length-prefixed bucket.
///
/// # Errors
///
/// Returns [`NostrError::Format`] if the plaintext is empty or longer than
/// [`MAX_PLAINTEXT_LEN`].
pub fn pad(plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let len = plaintext.len();
    if !(MIN_PLAINTEXT_LEN..=MAX_PLAINTEXT_LEN).contains(&len) {
        return Err(NostrError::Format(format!(
            "plaintext length {len} outside {MIN_PLAINTEXT_LEN}..={MAX_PLAINTEXT_LEN}"
        )));
    }

    let prefix = u16::try_from(len)
        .map_err(|_| NostrError::Format(format!("plaintext length {len} overflows prefix")))?;

    let mut padded = Zeroizing::new(vec![0u8; LENGTH_PREFIX_SIZE + padded_len(len)]);
    padded[..LENGTH_PREFIX_SIZE].copy_from_slice(&prefix.to_be_bytes());
    padded[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + len].copy_from_slice(plaintext);
    Ok(padded)
}

/// Strips padding, reading the explicit length prefix.
///
/// # Errors
///
/// Returns [`NostrError::Format`] if the prefix is zero, points past the
/// body, or the body is not the bucket size for that length.
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>> {
    if padded.len() < LENGTH_PREFIX_SIZE {
        return Err(NostrError::Format("padded body too short".to_string()));
    }

    let len = usize::from(u16::from_be_bytes([padded[0], padded[1]]));
    let body = &padded[LENGTH_PREFIX_SIZE..];

    if len < MIN_PLAINTEXT_LEN || len > body.len() {
        return Err(NostrError::Format(format!(
            "invalid length prefix {len} for {} byte body",
            body.len()
        )));
    }
    if body.len() != padded_len(len) {
        return Err(NostrError::Format(format!(
            "padding mismatch: {} byte body for {len} byte plaintext",
            body.len()
        )));
    }

    Ok(body[..len].to_vec())
}
