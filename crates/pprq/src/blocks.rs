//! Block-wise prefix encoding of 32-bit readings.
//!
//! A reading is sliced MSB-first into [`BLOCK_COUNT`] blocks of
//! [`BLOCK_BITS`] bits. Each block is addressed by its *prefix*, the integer
//! value of every more-significant bit; two readings agree on a block's
//! prefix exactly when they share all bits above it. Comparing two readings
//! therefore reduces to a per-block question: at the first block where the
//! prefixes still agree and the block values differ, the larger block value
//! decides the order.
//!
//! The exponent derivation binds a block statement (`"2>"`, `"0<"`, …) to
//! its position by hashing the prefix in front of it. The first block has no
//! more-significant bits; its derivation omits the prefix entirely, and the
//! `-1` placeholder passed for it is never formatted or hashed.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::prf::{self, Exponent};
use crate::types::{MasterKey, BLOCK_BITS, PLAINTEXT_BITS};

/// Placeholder prefix for the first block. Only the branch that skips the
/// prefix ever observes it.
pub(crate) const FIRST_BLOCK_PREFIX: i64 = -1;

// ── Block arithmetic ──────────────────────────────────────────────────────────

/// Value of block `j` of `v`, reading blocks MSB-first.
pub(crate) fn block_value(v: u32, j: usize) -> u8 {
    let shift = PLAINTEXT_BITS - (j + 1) * BLOCK_BITS;
    ((v >> shift) & ((1u32 << BLOCK_BITS) - 1)) as u8
}

/// Prefix of block `j` of `v`: the integer value of all bits above the
/// block, or [`FIRST_BLOCK_PREFIX`] for `j == 0`.
pub(crate) fn block_prefix(v: u32, j: usize) -> i64 {
    if j == 0 {
        FIRST_BLOCK_PREFIX
    } else {
        i64::from(v >> (PLAINTEXT_BITS - j * BLOCK_BITS))
    }
}

// ── Comparator tags ───────────────────────────────────────────────────────────

/// Direction glyph appended to a block value's decimal form.
///
/// The glyphs are the ASCII bytes `0x3E` / `0x3C`; no other encoding is
/// involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparator {
    /// `>` — the statement's subject exceeds the tagged value.
    Greater,
    /// `<` — the statement's subject is below the tagged value.
    Less,
}

impl Comparator {
    fn glyph(self) -> char {
        match self {
            Comparator::Greater => '>',
            Comparator::Less => '<',
        }
    }
}

/// The tagged statement string for a block value, e.g. `"2>"`.
pub(crate) fn tagged_block(value: u8, cmp: Comparator) -> String {
    format!("{}{}", value, cmp.glyph())
}

// ── Exponent derivation ───────────────────────────────────────────────────────

/// Derive the hashed exponent for a tagged block statement at `block_pos`.
///
/// Block 0: `HMAC_K(tag)`. Later blocks: `HMAC_K(SHA256(decimal(prefix)) ∥
/// tag)`, binding the statement to its bit position. The prefix enters as
/// the base-10 ASCII form of its integer value.
pub(crate) fn hashed_exponent(
    key: &MasterKey,
    tag: &str,
    prefix: i64,
    block_pos: usize,
) -> Exponent {
    if block_pos == 0 {
        Exponent::from_digest(prf::keyed_digest(key.as_bytes(), tag.as_bytes()))
    } else {
        let prefix_digest = prf::plain_digest(format!("{prefix}").as_bytes());
        let mut msg = Vec::with_capacity(prefix_digest.len() + tag.len());
        msg.extend_from_slice(&prefix_digest);
        msg.extend_from_slice(tag.as_bytes());
        Exponent::from_digest(prf::keyed_digest(key.as_bytes(), &msg))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
