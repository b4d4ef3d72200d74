//! Server-side matching of a query token against an encrypted index.
//!
//! # Matching rule
//!
//! Per record and bound, the matcher asks each block position whether the
//! token's statement for that position reappears among the record's sealed
//! statements. The sub-index keeps that cheap: only the bucket named by the
//! token's label is scanned, and the scan stops at the first empty slot
//! because buckets are packed from the front.
//!
//! A single block hit is a complete order witness (the first block where
//! two values' prefixes agree and their block values differ decides their
//! order), so block results combine disjunctively within a bound. A witness
//! in the lower half proves `value < lo`; one in the upper half proves
//! `value > hi`; a record is reported exactly when neither half finds one,
//! which keeps both endpoints of the range inclusive.
//!
//! # Complexity
//!
//! | Operation        | Time                                | Space |
//! |------------------|-------------------------------------|-------|
//! | [`Index::search`]| O(N · B · S) ciphertext comparisons | O(N)  |
//!
//! plus at most `B` sealings per record and bound; the sealed exponent is
//! cached per (record, block) and never recomputed across slots. Records
//! are independent, so the scan parallelises across them as long as results
//! are reassembled in record order.

use alloc::vec::Vec;

use crate::index::{Index, IndexBlock, IndexRecord};
use crate::prf;
use crate::query::{QueryBlock, QueryRange, QueryToken};
use crate::types::EMPTY_SLOT;

impl Index {
    /// Notes of all records whose reading lies in the token's range, in
    /// record order.
    pub fn search(&self, token: &QueryToken) -> Vec<u64> {
        // First pass: drop records proven below the lower bound; second
        // pass over the survivors: drop records proven above the upper.
        self.records()
            .iter()
            .filter(|record| !range_witness(record, token.lower()))
            .filter(|record| !range_witness(record, token.upper()))
            .map(IndexRecord::note)
            .collect()
    }
}

/// True when any block of `range` proves the record's value lies on the
/// excluded side of the bound.
fn range_witness(record: &IndexRecord, range: &QueryRange) -> bool {
    record
        .blocks()
        .iter()
        .zip(range.blocks())
        .any(|(block, qb)| block_witness(record.nonce(), block, qb))
}

/// Scan one block's bucket for a ciphertext equal to the query exponent
/// sealed under this record's nonce.
fn block_witness(nonce: &[u8], block: &IndexBlock, qb: &QueryBlock) -> bool {
    let mut sealed = None;
    for &slot in block.bucket(qb.bucket_label()) {
        if slot == EMPTY_SLOT {
            break;
        }
        let sealed = sealed.get_or_insert_with(|| prf::seal(nonce, qb.exponent_bytes()));
        if block.cipher(slot) == &*sealed {
            return true;
        }
    }
    false
}

// ── Tests ─────────────────────────────────────────────────────────────────────
