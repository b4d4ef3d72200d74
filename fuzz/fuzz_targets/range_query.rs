#![no_main]

//! Fuzz harness for the encrypted range-query pipeline.
//!
//! # What is fuzzed
//!
//! | Target                | What we are looking for                          |
//! |-----------------------|--------------------------------------------------|
//! | Encrypt → match       | Result equals a plaintext scan for any readings  |
//! |                       | and bounds, endpoints included                   |
//! | Wire round-trip       | Re-parsed index/token are equal and answer       |
//! |                       | identically                                      |
//! | Token reuse           | One token answers consistently across two        |
//! |                       | indices over the same readings                   |
//!
//! # What is NOT fuzzed here
//!
//! Rejection of malformed *externally supplied* bytes is exercised by
//! dedicated decoder tests in the `pprq` crate itself (`wire::tests`). The
//! fuzzer targets the produce-then-consume round-trip to catch internal
//! invariant violations.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pprq::index::Index;
use pprq::query::QueryToken;
use pprq::types::{MasterKey, NONCE_LEN};

// ── Fuzz input ────────────────────────────────────────────────────────────────

#[derive(Arbitrary, Debug)]
struct FuzzCase {
    /// Readings to encrypt (clamped to a small batch; each record costs
    /// dozens of HMAC invocations).
    values: Vec<u32>,
    lo: u32,
    hi: u32,
    /// Per-record nonce seed, expanded below.
    nonce_seed: u8,
    key_seed: u8,
}

/// Expand a seed into a full-length record nonce.
fn nonce_for(seed: u8, record: usize) -> Vec<u8> {
    (0..NONCE_LEN)
        .map(|j| seed ^ (record as u8).wrapping_mul(97) ^ (j as u8).wrapping_mul(13))
        .collect()
}

// ── Fuzz entry point ──────────────────────────────────────────────────────────

fuzz_target!(|case: FuzzCase| {
    let mut values = case.values;
    values.truncate(8);
    let (lo, hi) = (case.lo.min(case.hi), case.lo.max(case.hi));

    let key = MasterKey::from_bytes(&[case.key_seed; 256]).expect("fixed-size key");
    let entries: Vec<(u32, u64)> = values.iter().map(|&v| (v, u64::from(v))).collect();
    let nonces: Vec<Vec<u8>> = (0..values.len())
        .map(|i| nonce_for(case.nonce_seed, i))
        .collect();

    let index = Index::encrypt_with_nonces(&key, &entries, &nonces)
        .expect("encryption cannot fail with shipped parameters");
    let token = QueryToken::encrypt(&key, lo, hi).expect("token construction cannot fail");

    // Invariant: the encrypted pipeline answers exactly like a plaintext
    // scan, in record order.
    let expected: Vec<u64> = values
        .iter()
        .filter(|&&v| lo <= v && v <= hi)
        .map(|&v| u64::from(v))
        .collect();
    let result = index.search(&token);
    assert_eq!(result, expected, "range [{lo}, {hi}] over {values:?}");

    // Invariant: serialization is the identity and preserves answers.
    let index2 = Index::from_bytes(&index.to_bytes()).expect("own bytes must re-parse");
    let token2 = QueryToken::from_bytes(&token.to_bytes()).expect("own bytes must re-parse");
    assert_eq!(index, index2, "index changed across a round-trip");
    assert_eq!(token, token2, "token changed across a round-trip");
    assert_eq!(index2.search(&token2), expected);

    // Invariant: a token is not bound to the index it was built alongside.
    let other_nonces: Vec<Vec<u8>> = (0..values.len())
        .map(|i| nonce_for(case.nonce_seed.wrapping_add(1), i))
        .collect();
    let other = Index::encrypt_with_nonces(&key, &entries, &other_nonces)
        .expect("encryption cannot fail with shipped parameters");
    assert_eq!(other.search(&token), expected, "token must be index-independent");
});
