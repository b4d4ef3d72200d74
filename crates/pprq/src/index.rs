//! Encrypted index construction.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  Index                                                    │
//! │    records: Vec<IndexRecord>        ← one per reading     │
//! │                                                           │
//! │  IndexRecord                                              │
//! │    nonce:  Vec<u8>                  ← per-record γ        │
//! │    note:   u64                      ← opaque identifier   │
//! │    blocks: Vec<IndexBlock>          ← BLOCK_COUNT entries │
//! │                                                           │
//! │  IndexBlock                                               │
//! │    buckets: [[u8; S]; S]            ← slot table          │
//! │    ciphers: [Digest; M−1]           ← sealed exponents    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Per block, the reading commits to every block value it is *not*: for each
//! other value `a` the builder seals the statement "`a` is on this side of
//! my block value" under the record nonce. A later query block that makes
//! the matching claim about its own bound reproduces the same exponent and,
//! after sealing under the record's nonce, the same ciphertext.
//!
//! The slot table partitions cipher positions by the exponent's bucket
//! label so the matcher inspects one bucket instead of the whole cipher
//! array. Buckets fill densely from the front; [`EMPTY_SLOT`] marks the end
//! of each bucket's occupancy.

use alloc::vec;
use alloc::vec::Vec;

use crate::blocks::{block_prefix, block_value, hashed_exponent, tagged_block, Comparator};
use crate::prf;
use crate::types::{
    validate_params, Digest, MasterKey, PprqError, BLOCK_CARDINALITY, BLOCK_COUNT, BUCKET_COUNT,
    CIPHERS_PER_BLOCK, EMPTY_SLOT, NONCE_LEN,
};

// ── IndexBlock ────────────────────────────────────────────────────────────────

/// One sealed block: the bucketed slot table plus its ciphertext array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBlock {
    /// `buckets[s]` lists cipher positions whose exponent reduced to `s`,
    /// densely packed from the front; the first [`EMPTY_SLOT`] ends the list.
    buckets: [[u8; BUCKET_COUNT]; BUCKET_COUNT],
    /// Sealed exponents, in block-value order of the statements they encode.
    ciphers: [Digest; CIPHERS_PER_BLOCK],
}

impl IndexBlock {
    /// Seal block `block_pos` of a reading whose block value is `value` and
    /// whose prefix is `prefix`.
    ///
    /// Walks every block value other than `value`, tagging smaller ones with
    /// `>` and larger ones with `<`, and distributes the sealed statements
    /// over the sub-index buckets.
    ///
    /// # Errors
    /// [`PprqError::BucketOverflow`] if more statements reduce to one bucket
    /// than it has slots. Unreachable with the shipped parameters, which
    /// insert exactly [`BUCKET_COUNT`] statements.
    fn seal(
        key: &MasterKey,
        value: u8,
        prefix: i64,
        block_pos: usize,
        nonce: &[u8],
    ) -> Result<Self, PprqError> {
        let mut buckets = [[EMPTY_SLOT; BUCKET_COUNT]; BUCKET_COUNT];
        let mut fill = [0usize; BUCKET_COUNT];
        let mut ciphers = [[0u8; 32]; CIPHERS_PER_BLOCK];
        let mut cipher_pos = 0usize;

        for a in 0..BLOCK_CARDINALITY {
            let a = a as u8;
            if a == value {
                continue;
            }
            let cmp = if a < value {
                Comparator::Greater
            } else {
                Comparator::Less
            };
            let exp = hashed_exponent(key, &tagged_block(a, cmp), prefix, block_pos);
            let bucket = exp.bucket_label() as usize;
            if fill[bucket] == BUCKET_COUNT {
                return Err(PprqError::BucketOverflow {
                    block: block_pos,
                    bucket: bucket as u8,
                });
            }
            buckets[bucket][fill[bucket]] = cipher_pos as u8;
            fill[bucket] += 1;
            ciphers[cipher_pos] = prf::seal(nonce, exp.min_bytes());
            cipher_pos += 1;
        }

        Ok(Self { buckets, ciphers })
    }

    /// The slot list of one bucket.
    #[inline]
    pub fn bucket(&self, label: u8) -> &[u8] {
        &self.buckets[label as usize]
    }

    /// The ciphertext at a slot-table position.
    #[inline]
    pub fn cipher(&self, position: u8) -> &Digest {
        &self.ciphers[position as usize]
    }

    /// Number of occupied slots across all buckets.
    pub fn occupied_slots(&self) -> usize {
        self.buckets
            .iter()
            .flatten()
            .filter(|&&slot| slot != EMPTY_SLOT)
            .count()
    }

    pub(crate) fn from_parts(
        buckets: [[u8; BUCKET_COUNT]; BUCKET_COUNT],
        ciphers: [Digest; CIPHERS_PER_BLOCK],
    ) -> Self {
        Self { buckets, ciphers }
    }

    pub(crate) fn buckets(&self) -> &[[u8; BUCKET_COUNT]; BUCKET_COUNT] {
        &self.buckets
    }

    pub(crate) fn ciphers(&self) -> &[Digest; CIPHERS_PER_BLOCK] {
        &self.ciphers
    }
}

// ── IndexRecord ───────────────────────────────────────────────────────────────

/// One encrypted reading: its nonce, its opaque note, and its sealed blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    nonce: Vec<u8>,
    note: u64,
    /// Invariant: exactly [`BLOCK_COUNT`] entries.
    blocks: Vec<IndexBlock>,
}

impl IndexRecord {
    /// Encrypt one reading under a freshly drawn nonce.
    pub fn seal(key: &MasterKey, value: u32, note: u64) -> Result<Self, PprqError> {
        let mut nonce = vec![0u8; NONCE_LEN];
        getrandom::fill(&mut nonce).map_err(PprqError::RandomnessFailure)?;
        Self::seal_with_nonce_inner(key, value, note, nonce)
    }

    /// Encrypt one reading under a caller-supplied nonce.
    ///
    /// Exposed for deterministic reconstruction in tests; production callers
    /// let [`IndexRecord::seal`] draw the nonce.
    #[cfg(any(test, feature = "testutils"))]
    pub fn seal_with_nonce(
        key: &MasterKey,
        value: u32,
        note: u64,
        nonce: Vec<u8>,
    ) -> Result<Self, PprqError> {
        Self::seal_with_nonce_inner(key, value, note, nonce)
    }

    fn seal_with_nonce_inner(
        key: &MasterKey,
        value: u32,
        note: u64,
        nonce: Vec<u8>,
    ) -> Result<Self, PprqError> {
        let mut blocks = Vec::with_capacity(BLOCK_COUNT);
        for j in 0..BLOCK_COUNT {
            blocks.push(IndexBlock::seal(
                key,
                block_value(value, j),
                block_prefix(value, j),
                j,
                &nonce,
            )?);
        }
        Ok(Self {
            nonce,
            note,
            blocks,
        })
    }

    /// The per-record nonce, released to the matching party.
    #[inline]
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// The opaque identifier returned on match.
    #[inline]
    pub fn note(&self) -> u64 {
        self.note
    }

    /// The sealed blocks, MSB-first.
    #[inline]
    pub fn blocks(&self) -> &[IndexBlock] {
        &self.blocks
    }

    pub(crate) fn from_parts(nonce: Vec<u8>, note: u64, blocks: Vec<IndexBlock>) -> Self {
        Self {
            nonce,
            note,
            blocks,
        }
    }
}

// ── Index ─────────────────────────────────────────────────────────────────────

/// The encrypted index: an ordered sequence of sealed readings.
///
/// Record order is preserved from the input and is the order in which match
/// results are reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    records: Vec<IndexRecord>,
}

impl Index {
    /// Encrypt a sequence of readings, using each reading as its own note.
    ///
    /// Convenient where the querier is also the data owner; callers that
    /// must keep plaintexts confidential at rest supply unrelated notes via
    /// [`Index::encrypt_with_notes`].
    pub fn encrypt(key: &MasterKey, values: &[u32]) -> Result<Self, PprqError> {
        let entries: Vec<(u32, u64)> = values.iter().map(|&v| (v, u64::from(v))).collect();
        Self::encrypt_with_notes(key, &entries)
    }

    /// Encrypt `(reading, note)` pairs. Notes are opaque to the scheme and
    /// are returned verbatim on match.
    pub fn encrypt_with_notes(key: &MasterKey, entries: &[(u32, u64)]) -> Result<Self, PprqError> {
        validate_params()?;
        let mut records = Vec::with_capacity(entries.len());
        for &(value, note) in entries {
            records.push(IndexRecord::seal(key, value, note)?);
        }
        Ok(Self { records })
    }

    /// Encrypt `(reading, note)` pairs under caller-supplied nonces, one per
    /// entry. **For deterministic tests only.**
    ///
    /// # Errors
    /// [`PprqError::BadLength`] when the nonce count differs from the entry
    /// count.
    #[cfg(any(test, feature = "testutils"))]
    pub fn encrypt_with_nonces(
        key: &MasterKey,
        entries: &[(u32, u64)],
        nonces: &[Vec<u8>],
    ) -> Result<Self, PprqError> {
        validate_params()?;
        if nonces.len() != entries.len() {
            return Err(PprqError::BadLength {
                what: "nonce list",
                found: nonces.len(),
            });
        }
        let mut records = Vec::with_capacity(entries.len());
        for (&(value, note), nonce) in entries.iter().zip(nonces) {
            records.push(IndexRecord::seal_with_nonce(key, value, note, nonce.clone())?);
        }
        Ok(Self { records })
    }

    /// The sealed records, in input order.
    #[inline]
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the index holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn from_records(records: Vec<IndexRecord>) -> Self {
        Self { records }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
