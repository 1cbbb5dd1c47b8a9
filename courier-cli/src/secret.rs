//! Locating the `nsec` secret key.
//!
//! Lookup order: `--nsec`, then `NOSTR_NSEC` (both via clap), then the
//! file `~/.nostr_nsec`. The secret is held in [`Zeroizing`] buffers and
//! never appears in error messages.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use zeroize::Zeroizing;

/// Environment variable consulted when `--nsec` is absent.
pub const NSEC_ENV: &str = "NOSTR_NSEC";

/// File name of the secret key under the home directory.
pub const NSEC_FILE_NAME: &str = ".nostr_nsec";

/// Returns `~/.nostr_nsec`, if a home directory is known.
pub fn default_nsec_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(NSEC_FILE_NAME))
}

/// Resolves the secret key from the command line value or `nsec_file`.
///
/// # Errors
///
/// Fails if no non-empty value is found.
pub fn resolve_nsec(explicit: Option<&str>, nsec_file: Option<&Path>) -> Result<Zeroizing<String>> {
    if let Some(value) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(Zeroizing::new(value.to_string()));
    }

    let Some(path) = nsec_file else {
        bail!("no secret key: pass --nsec or set {NSEC_ENV}");
    };

    let contents = Zeroizing::new(fs::read_to_string(path).with_context(|| {
        format!(
            "no secret key: pass --nsec, set {NSEC_ENV}, or create {}",
            path.display()
        )
    })?);

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        bail!("secret key file {} is empty", path.display());
    }

    Ok(Zeroizing::new(trimmed.to_string()))
}
