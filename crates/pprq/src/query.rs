//! Query token construction.
//!
//! A token carries one [`QueryRange`] per bound. Each range holds, per block
//! position, the bucket label and the raw exponent for a single tagged
//! statement about the bound's block value at that position:
//!
//! * the **lower** half tags with `<`, so a block of it seals (under a
//!   record's nonce) to a stored ciphertext exactly when the record's value
//!   is *below* the lower bound;
//! * the **upper** half tags with `>`, sealing to a stored ciphertext
//!   exactly when the record's value is *above* the upper bound.
//!
//! A record is in range when neither half finds such a witness, which makes
//! both endpoints inclusive. The matching rule itself lives in
//! [`crate::search`].
//!
//! Tokens carry no per-record state: the same token may be run against any
//! index sealed under the same master key.

use alloc::vec::Vec;

use crate::blocks::{block_prefix, block_value, hashed_exponent, tagged_block, Comparator};
use crate::types::{validate_params, MasterKey, PprqError, BLOCK_COUNT};

// ── QueryBlock ────────────────────────────────────────────────────────────────

/// One block's share of a bound: its bucket label and its exponent in
/// minimal big-endian form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock {
    bucket: u8,
    exponent: Vec<u8>,
}

impl QueryBlock {
    /// The sub-index bucket this block addresses in every record.
    #[inline]
    pub fn bucket_label(&self) -> u8 {
        self.bucket
    }

    /// The exponent bytes (big-endian, no leading zero byte).
    #[inline]
    pub fn exponent_bytes(&self) -> &[u8] {
        &self.exponent
    }

    pub(crate) fn from_parts(bucket: u8, exponent: Vec<u8>) -> Self {
        Self { bucket, exponent }
    }
}

// ── QueryRange ────────────────────────────────────────────────────────────────

/// One bound's statements, one [`QueryBlock`] per block position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRange {
    /// Invariant: exactly [`BLOCK_COUNT`] entries, MSB-first.
    blocks: Vec<QueryBlock>,
}

impl QueryRange {
    fn seal(key: &MasterKey, bound: u32, cmp: Comparator) -> Self {
        let blocks = (0..BLOCK_COUNT)
            .map(|j| {
                let tag = tagged_block(block_value(bound, j), cmp);
                let exp = hashed_exponent(key, &tag, block_prefix(bound, j), j);
                QueryBlock {
                    bucket: exp.bucket_label(),
                    exponent: exp.min_bytes().to_vec(),
                }
            })
            .collect();
        Self { blocks }
    }

    /// The per-position blocks, MSB-first.
    #[inline]
    pub fn blocks(&self) -> &[QueryBlock] {
        &self.blocks
    }

    pub(crate) fn from_blocks(blocks: Vec<QueryBlock>) -> Self {
        Self { blocks }
    }
}

// ── QueryToken ────────────────────────────────────────────────────────────────

/// An encrypted range predicate `value ∈ [lo, hi]`, both endpoints included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    lower: QueryRange,
    upper: QueryRange,
}

impl QueryToken {
    /// Build the token for `value ∈ [lo, hi]`.
    ///
    /// The token reveals nothing about the bounds beyond what the match
    /// bits disclose; in particular it is safe to hand to the party that
    /// stores the index.
    pub fn encrypt(key: &MasterKey, lo: u32, hi: u32) -> Result<Self, PprqError> {
        validate_params()?;
        Ok(Self {
            lower: QueryRange::seal(key, lo, Comparator::Less),
            upper: QueryRange::seal(key, hi, Comparator::Greater),
        })
    }

    /// The lower bound's range (witnesses `value < lo`).
    #[inline]
    pub fn lower(&self) -> &QueryRange {
        &self.lower
    }

    /// The upper bound's range (witnesses `value > hi`).
    #[inline]
    pub fn upper(&self) -> &QueryRange {
        &self.upper
    }

    pub(crate) fn from_ranges(lower: QueryRange, upper: QueryRange) -> Self {
        Self { lower, upper }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
