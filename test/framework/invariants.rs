//! # Invariant Definitions & Verification
//!
//! Invariants that must hold after any encrypt → query → match run,
//! checked against a [`SchemeSnapshot`]. Each is named so violations read
//! well in failure output, and `standard_invariants` bundles them for
//! exhaustive sweeps.

use pprq::index::Index;
use pprq::query::QueryToken;
use pprq::types::{BLOCK_COUNT, BUCKET_COUNT, CIPHERS_PER_BLOCK, EMPTY_SLOT};

use super::SchemeSnapshot;

// ── Invariant Trait ──────────────────────────────────────────────────────────

/// A named invariant verifiable against a run snapshot.
pub trait Invariant {
    /// Human-readable name for failure messages.
    fn name(&self) -> &str;

    /// Check the invariant. `Err(description)` on violation.
    fn check(&self, snapshot: &SchemeSnapshot) -> Result<(), String>;
}

/// Every invariant in this module, boxed for sweeping.
pub fn standard_invariants() -> Vec<Box<dyn Invariant>> {
    vec![
        Box::new(OracleConsistency),
        Box::new(OrderPreservation),
        Box::new(BucketPacking),
        Box::new(WireRoundTrip),
    ]
}

// ── Built-in Invariants ──────────────────────────────────────────────────────

/// **Oracle consistency**: the match result equals a plaintext scan.
///
/// This is the correctness contract of the whole scheme: a reading is
/// reported exactly when `lo <= v <= hi`, endpoints included.
pub struct OracleConsistency;

impl Invariant for OracleConsistency {
    fn name(&self) -> &str {
        "match result == plaintext range scan"
    }

    fn check(&self, snapshot: &SchemeSnapshot) -> Result<(), String> {
        let expected = snapshot.expected();
        if snapshot.result != expected {
            return Err(format!(
                "query [{}, {}] over {:?}: got {:?}, expected {:?}",
                snapshot.lo, snapshot.hi, snapshot.values, snapshot.result, expected
            ));
        }
        Ok(())
    }
}

/// **Order preservation**: reported notes appear in index order.
///
/// The matcher must not reorder records; downstream consumers rely on the
/// result sequence mirroring the index sequence.
pub struct OrderPreservation;

impl Invariant for OrderPreservation {
    fn name(&self) -> &str {
        "result order mirrors index order"
    }

    fn check(&self, snapshot: &SchemeSnapshot) -> Result<(), String> {
        // The result must be a subsequence of the index's note sequence.
        let notes: Vec<u64> = snapshot.index.records().iter().map(|r| r.note()).collect();
        let mut cursor = 0usize;
        for reported in &snapshot.result {
            match notes[cursor..].iter().position(|n| n == reported) {
                Some(offset) => cursor += offset + 1,
                None => {
                    return Err(format!(
                        "note {reported} out of order (index notes {notes:?}, result {:?})",
                        snapshot.result
                    ))
                }
            }
        }
        Ok(())
    }
}

/// **Bucket packing**: every block carries exactly its non-matching
/// statements, densely packed.
///
/// Each block must hold [`CIPHERS_PER_BLOCK`] occupied slots across its
/// buckets, every slot index must be a valid cipher position, and no
/// occupied slot may follow the end-of-bucket sentinel.
pub struct BucketPacking;

impl Invariant for BucketPacking {
    fn name(&self) -> &str {
        "blocks pack exactly their statements into valid slots"
    }

    fn check(&self, snapshot: &SchemeSnapshot) -> Result<(), String> {
        for (i, record) in snapshot.index.records().iter().enumerate() {
            if record.blocks().len() != BLOCK_COUNT {
                return Err(format!(
                    "record {i} has {} blocks, expected {BLOCK_COUNT}",
                    record.blocks().len()
                ));
            }
            for (j, block) in record.blocks().iter().enumerate() {
                if block.occupied_slots() != CIPHERS_PER_BLOCK {
                    return Err(format!(
                        "record {i} block {j}: {} occupied slots, expected {CIPHERS_PER_BLOCK}",
                        block.occupied_slots()
                    ));
                }
                for label in 0..BUCKET_COUNT as u8 {
                    let mut ended = false;
                    for &slot in block.bucket(label) {
                        if slot == EMPTY_SLOT {
                            ended = true;
                        } else if ended {
                            return Err(format!(
                                "record {i} block {j} bucket {label}: occupied slot after end marker"
                            ));
                        } else if (slot as usize) >= CIPHERS_PER_BLOCK {
                            return Err(format!(
                                "record {i} block {j} bucket {label}: slot {slot} out of range"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// **Wire round-trip**: serializing and re-parsing both artifacts is the
/// identity, and matching on the round-tripped pair answers identically.
pub struct WireRoundTrip;

impl Invariant for WireRoundTrip {
    fn name(&self) -> &str {
        "serialize/deserialize is the identity"
    }

    fn check(&self, snapshot: &SchemeSnapshot) -> Result<(), String> {
        let index = Index::from_bytes(&snapshot.index.to_bytes())
            .map_err(|e| format!("index failed to re-parse: {e}"))?;
        if index != snapshot.index {
            return Err("index changed across a round-trip".into());
        }
        let token = QueryToken::from_bytes(&snapshot.token.to_bytes())
            .map_err(|e| format!("token failed to re-parse: {e}"))?;
        if token != snapshot.token {
            return Err("token changed across a round-trip".into());
        }
        let replayed = index.search(&token);
        if replayed != snapshot.result {
            return Err(format!(
                "round-tripped pair answered {replayed:?}, original answered {:?}",
                snapshot.result
            ));
        }
        Ok(())
    }
}
