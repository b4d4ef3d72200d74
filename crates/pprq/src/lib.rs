//! # `pprq` — Privacy-Preserving Range Queries over Encrypted Scalars
//!
//! This crate lets a semi-trusted store answer range predicates
//! `value ∈ [lo, hi]` over encrypted 32-bit readings without learning the
//! readings, the bounds, or anything beyond the per-record match bit. It is
//! built on:
//!
//! * **Block-wise prefix encoding** — a reading is sliced into 2-bit blocks;
//!   a range comparison reduces to equality tests over short tagged
//!   statements about individual blocks.
//! * **Keyed one-way encoding** — statements are hashed under the master key
//!   (HMAC-SHA256) into exponents, then sealed per record under a random
//!   nonce, so equal statements are unlinkable across records.
//! * **Sub-index bucketing** — per block, ciphertexts are partitioned into
//!   buckets by exponent residue, cutting matching from O(B·M) to roughly
//!   O(B) comparisons per record.
//! * **Two-bound conjunctive search** — a record is reported when neither
//!   bound of the token can prove it out of range.
//!
//! ## Module layout
//!
//! | Module     | Purpose                                               |
//! |------------|-------------------------------------------------------|
//! | [`types`]  | Scheme parameters, `MasterKey`, `PprqError`           |
//! | [`index`]  | `Index` / `IndexRecord` — encrypted index construction|
//! | [`query`]  | `QueryToken` — encrypted range predicates             |
//! | [`search`] | Matching a token against an index                     |
//! | [`wire`]   | Canonical byte layout for interop                     |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pprq::{index::Index, query::QueryToken, types::MasterKey};
//!
//! // The data owner holds the key; the store never sees it.
//! let key = MasterKey::generate()?;
//!
//! // Encrypt readings (here each reading doubles as its own note).
//! let index = Index::encrypt(&key, &[10_000, 15_000, 26_630])?;
//!
//! // Ask for everything in [10_000, 20_000], endpoints included.
//! let token = QueryToken::encrypt(&key, 10_000, 20_000)?;
//! assert_eq!(index.search(&token), vec![10_000, 15_000]);
//! ```
//!
//! ## `no_std` compatibility
//!
//! The crate is `#![no_std]` with `extern crate alloc`. Randomness for keys
//! and nonces comes from [`getrandom`], the only point of contact with the
//! operating system.

#![no_std]

extern crate alloc;

mod blocks;
mod prf;

pub mod index;
pub mod query;
pub mod search;
pub mod types;
pub mod wire;
