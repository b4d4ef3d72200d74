//! Canonical byte layout of indices and query tokens.
//!
//! The layout is fixed and self-delimiting; multi-byte integers are
//! little-endian, hash-derived bytes are big-endian big-integer data as the
//! hashes produce them.
//!
//! ```text
//! QueryBlock   := bucket_label(1) ‖ exp_len(1) ‖ exponent(exp_len)
//! QueryRange   := QueryBlock × BLOCK_COUNT
//! QueryToken   := QueryRange(lower) ‖ QueryRange(upper)
//!
//! IndexBlock   := slots(S·S) ‖ (cipher_len(1) ‖ cipher(32)) × (M−1)
//! IndexRecord  := nonce_len(2 LE) ‖ nonce ‖ note(8 LE) ‖ IndexBlock × BLOCK_COUNT
//! Index        := record_count(4 LE) ‖ IndexRecord × record_count
//! ```
//!
//! Decoding fails closed: slot bytes must be valid cipher positions or the
//! empty sentinel, bucket labels must be in range, cipher lengths must be
//! exactly 32, exponents must carry no leading zero byte, and no input may
//! remain after the last field.

use alloc::vec::Vec;

use crate::index::{Index, IndexBlock, IndexRecord};
use crate::query::{QueryBlock, QueryRange, QueryToken};
use crate::types::{
    validate_params, Digest, PprqError, BLOCK_COUNT, BUCKET_COUNT, CIPHERS_PER_BLOCK, EMPTY_SLOT,
};

// ── Reader ────────────────────────────────────────────────────────────────────

/// A consuming view over an input slice with step-labelled truncation
/// errors.
struct Reader<'a> {
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { rest: buf }
    }

    fn take(&mut self, n: usize, step: &'static str) -> Result<&'a [u8], PprqError> {
        if self.rest.len() < n {
            return Err(PprqError::Truncated {
                step,
                needed: n,
                remaining: self.rest.len(),
            });
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    fn u8(&mut self, step: &'static str) -> Result<u8, PprqError> {
        Ok(self.take(1, step)?[0])
    }

    fn u16_le(&mut self, step: &'static str) -> Result<u16, PprqError> {
        let b = self.take(2, step)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_le(&mut self, step: &'static str) -> Result<u32, PprqError> {
        let b = self.take(4, step)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64_le(&mut self, step: &'static str) -> Result<u64, PprqError> {
        let b = self.take(8, step)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_le_bytes(raw))
    }

    fn finish(self) -> Result<(), PprqError> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(PprqError::TrailingBytes {
                count: self.rest.len(),
            })
        }
    }
}

// ── Query token ───────────────────────────────────────────────────────────────

fn encode_query_block(qb: &QueryBlock, out: &mut Vec<u8>) {
    out.push(qb.bucket_label());
    out.push(qb.exponent_bytes().len() as u8);
    out.extend_from_slice(qb.exponent_bytes());
}

fn decode_query_block(r: &mut Reader<'_>) -> Result<QueryBlock, PprqError> {
    let bucket = r.u8("query bucket label")?;
    if (bucket as usize) >= BUCKET_COUNT {
        return Err(PprqError::BadBucketLabel { found: bucket });
    }
    let len = r.u8("query exponent length")? as usize;
    if len > 32 {
        return Err(PprqError::BadLength {
            what: "query exponent",
            found: len,
        });
    }
    let exponent = r.take(len, "query exponent")?;
    if exponent.first() == Some(&0) {
        return Err(PprqError::Malformed("query exponent has a leading zero byte"));
    }
    Ok(QueryBlock::from_parts(bucket, exponent.to_vec()))
}

fn decode_query_range(r: &mut Reader<'_>) -> Result<QueryRange, PprqError> {
    let mut blocks = Vec::with_capacity(BLOCK_COUNT);
    for _ in 0..BLOCK_COUNT {
        blocks.push(decode_query_block(r)?);
    }
    Ok(QueryRange::from_blocks(blocks))
}

impl QueryToken {
    /// Serialize into the canonical layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Worst case per block: label + length + a full 32-byte exponent.
        let mut out = Vec::with_capacity(2 * BLOCK_COUNT * 34);
        for qb in self.lower().blocks().iter().chain(self.upper().blocks()) {
            encode_query_block(qb, &mut out);
        }
        out
    }

    /// Parse from the canonical layout, rejecting anything non-canonical.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PprqError> {
        validate_params()?;
        let mut r = Reader::new(buf);
        let lower = decode_query_range(&mut r)?;
        let upper = decode_query_range(&mut r)?;
        r.finish()?;
        Ok(QueryToken::from_ranges(lower, upper))
    }
}

// ── Index ─────────────────────────────────────────────────────────────────────

fn encode_index_block(block: &IndexBlock, out: &mut Vec<u8>) {
    for bucket in block.buckets() {
        out.extend_from_slice(bucket);
    }
    for cipher in block.ciphers() {
        out.push(cipher.len() as u8);
        out.extend_from_slice(cipher);
    }
}

fn decode_index_block(r: &mut Reader<'_>) -> Result<IndexBlock, PprqError> {
    let mut buckets = [[EMPTY_SLOT; BUCKET_COUNT]; BUCKET_COUNT];
    for bucket in buckets.iter_mut() {
        let raw = r.take(BUCKET_COUNT, "bucket slots")?;
        for (slot, &byte) in bucket.iter_mut().zip(raw) {
            if byte != EMPTY_SLOT && (byte as usize) >= CIPHERS_PER_BLOCK {
                return Err(PprqError::BadSlotSentinel { found: byte });
            }
            *slot = byte;
        }
    }

    let mut ciphers = [[0u8; 32]; CIPHERS_PER_BLOCK];
    for cipher in ciphers.iter_mut() {
        let len = r.u8("cipher length")? as usize;
        if len != 32 {
            return Err(PprqError::BadLength {
                what: "block cipher",
                found: len,
            });
        }
        cipher.copy_from_slice(r.take(len, "block cipher")?);
    }

    Ok(IndexBlock::from_parts(buckets, ciphers))
}

fn decode_index_record(r: &mut Reader<'_>) -> Result<IndexRecord, PprqError> {
    let nonce_len = r.u16_le("nonce length")? as usize;
    let nonce = r.take(nonce_len, "nonce")?.to_vec();
    let note = r.u64_le("note")?;
    let mut blocks = Vec::with_capacity(BLOCK_COUNT);
    for _ in 0..BLOCK_COUNT {
        blocks.push(decode_index_block(r)?);
    }
    Ok(IndexRecord::from_parts(nonce, note, blocks))
}

impl Index {
    /// Serialize into the canonical layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let per_block = BUCKET_COUNT * BUCKET_COUNT + CIPHERS_PER_BLOCK * 33;
        let per_record = 2 + 8 + BLOCK_COUNT * per_block;
        let mut out = Vec::with_capacity(4 + self.len() * (per_record + 256));
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for record in self.records() {
            out.extend_from_slice(&(record.nonce().len() as u16).to_le_bytes());
            out.extend_from_slice(record.nonce());
            out.extend_from_slice(&record.note().to_le_bytes());
            for block in record.blocks() {
                encode_index_block(block, &mut out);
            }
        }
        out
    }

    /// Parse from the canonical layout, rejecting anything non-canonical.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PprqError> {
        validate_params()?;
        let mut r = Reader::new(buf);
        let count = r.u32_le("record count")? as usize;
        let mut records = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            records.push(decode_index_record(&mut r)?);
        }
        r.finish()?;
        Ok(Index::from_records(records))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
