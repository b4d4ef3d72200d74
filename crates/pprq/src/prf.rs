//! Keyed byte-string primitives and exponent arithmetic.
//!
//! Three functions carry all of the cryptography:
//!
//! * `keyed_digest` — HMAC-SHA256, used both under the master key (exponent
//!   derivation) and under a per-record nonce (ciphertext sealing).
//! * `plain_digest` — SHA-256, used to compress a block's prefix before it
//!   enters the exponent derivation.
//! * [`seal`] — the ciphertext layer: HMAC-SHA256 under a record nonce over
//!   the canonical byte form of an exponent.
//!
//! An [`Exponent`] is an HMAC output read as a 256-bit big-endian unsigned
//! integer. Its canonical byte form is the minimal big-endian encoding with
//! leading zero bytes stripped; zero encodes as the empty string. Reproducing
//! that encoding exactly is what keeps ciphertexts identical across
//! implementations, so both it and the bucket reduction live here next to
//! the hash calls.

use hmac::{Hmac, Mac};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::types::{Digest, BUCKET_COUNT};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `msg` under `key`.
pub(crate) fn keyed_digest(key: &[u8], msg: &[u8]) -> Digest {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length ≥ 0");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// SHA-256 of `msg`.
pub(crate) fn plain_digest(msg: &[u8]) -> Digest {
    let mut h = Sha256::new();
    h.update(msg);
    h.finalize().into()
}

/// Seal exponent bytes under a record nonce.
///
/// The input is normalised to its minimal form first, so callers may pass
/// either a full 32-byte digest or an already-stripped encoding.
pub(crate) fn seal(nonce: &[u8], exponent_bytes: &[u8]) -> Digest {
    keyed_digest(nonce, strip_leading_zeros(exponent_bytes))
}

/// View `bytes` with leading zero bytes removed. All-zero input yields the
/// empty slice.
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

// ── Exponent ──────────────────────────────────────────────────────────────────

/// An HMAC output interpreted as a 256-bit big-endian unsigned integer.
///
/// Derives both the sub-index bucket label (reduction modulo
/// [`BUCKET_COUNT`]) and the canonical byte form fed to [`seal`].
#[derive(Clone, Copy)]
pub(crate) struct Exponent(Digest);

impl Exponent {
    pub(crate) fn from_digest(digest: Digest) -> Self {
        Self(digest)
    }

    /// The sub-index bucket this exponent selects.
    pub(crate) fn bucket_label(&self) -> u8 {
        fold_mod(&self.0, BUCKET_COUNT as u16)
    }

    /// Minimal big-endian encoding: leading zero bytes stripped.
    pub(crate) fn min_bytes(&self) -> &[u8] {
        strip_leading_zeros(&self.0)
    }
}

/// Big-endian `bytes` reduced modulo `modulus`.
///
/// Exact for any `modulus < 256`: the accumulator stays below
/// `modulus · 256 + 255`, which fits comfortably in 32 bits.
fn fold_mod(bytes: &[u8], modulus: u16) -> u8 {
    let m = u32::from(modulus);
    bytes
        .iter()
        .fold(0u32, |acc, &b| ((acc << 8) | u32::from(b)) % m) as u8
}

// ── Tests ─────────────────────────────────────────────────────────────────────
