/// Core domain types and scheme parameters.
///
/// Design principles:
/// - Scheme parameters are compile-time constants; everything sized by them
///   uses fixed-size arrays so the layout is known at compile time.
/// - Key material derives only `Clone`. No `Debug`, no `PartialEq`: keys are
///   never printed or compared.
/// - Every failure mode is a variant of one closed enum so callers can
///   exhaustively match and the compiler enforces handling.

// ── Scheme parameters ─────────────────────────────────────────────────────────

/// Plaintext width in bits. Readings are unsigned 32-bit scalars.
pub const PLAINTEXT_BITS: usize = 32;

/// Bits per block. Each reading is sliced MSB-first into blocks of this width.
pub const BLOCK_BITS: usize = 2;

/// Blocks per reading.
pub const BLOCK_COUNT: usize = PLAINTEXT_BITS / BLOCK_BITS;

/// Number of distinct values a block can take.
pub const BLOCK_CARDINALITY: u16 = 1 << BLOCK_BITS;

/// Sub-index buckets per block. Exponents are distributed over buckets by
/// reduction modulo this count.
pub const BUCKET_COUNT: usize = (BLOCK_CARDINALITY - 1) as usize;

/// Ciphertexts stored per block: one for every block value other than the
/// reading's own.
pub const CIPHERS_PER_BLOCK: usize = (BLOCK_CARDINALITY - 1) as usize;

/// Per-record nonce length in bytes. Far larger than an HMAC key needs to be
/// (anything ≥ 32 bytes is cryptographically sufficient), but preserved so
/// that existing indices remain readable.
pub const NONCE_LEN: usize = 256;

/// Master key length in bytes.
pub const MASTER_KEY_LEN: usize = 256;

/// Marks an unused bucket slot. Must lie outside the valid cipher-position
/// range `[0, BLOCK_CARDINALITY)`; `validate_params` rejects parameter sets
/// where it does not.
pub const EMPTY_SLOT: u8 = 100;

/// A SHA-256 / HMAC-SHA256 output (32 bytes). Used for index ciphertexts and
/// intermediate digests throughout the crate.
pub type Digest = [u8; 32];

/// Check that the scheme constants are mutually consistent.
///
/// With the shipped constants this never fails; it exists so that an
/// inconsistent edit to the parameters above surfaces as an error from the
/// top-level operations instead of as silent data corruption.
pub fn validate_params() -> Result<(), PprqError> {
    if BLOCK_BITS == 0 {
        return Err(PprqError::InvalidParameters {
            detail: "block width must be at least one bit",
        });
    }
    if BLOCK_BITS > 8 {
        return Err(PprqError::InvalidParameters {
            detail: "block width above 8 bits overflows slot bytes",
        });
    }
    if PLAINTEXT_BITS % BLOCK_BITS != 0 {
        return Err(PprqError::InvalidParameters {
            detail: "plaintext width must be a multiple of the block width",
        });
    }
    if BUCKET_COUNT != (BLOCK_CARDINALITY - 1) as usize {
        return Err(PprqError::InvalidParameters {
            detail: "bucket count must equal the block cardinality minus one",
        });
    }
    if (EMPTY_SLOT as u16) < BLOCK_CARDINALITY {
        return Err(PprqError::InvalidParameters {
            detail: "empty-slot sentinel collides with a valid cipher position",
        });
    }
    if CIPHERS_PER_BLOCK > BUCKET_COUNT * BUCKET_COUNT {
        return Err(PprqError::InvalidParameters {
            detail: "per-block ciphertexts exceed total bucket capacity",
        });
    }
    Ok(())
}

// ── MasterKey ─────────────────────────────────────────────────────────────────

/// The symmetric master key shared by the indexer and the query issuer.
///
/// The key keys every exponent derivation; it is never handed to the party
/// that stores the index and runs the matching. Using a value from a
/// cryptographically secure source is mandatory; [`MasterKey::generate`]
/// draws one from the OS.
#[derive(Clone)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    /// Draw a fresh key from the operating system's randomness source.
    ///
    /// # Errors
    /// [`PprqError::RandomnessFailure`] when the OS RNG fails, and
    /// [`PprqError::InvalidParameters`] when the scheme constants are
    /// inconsistent.
    pub fn generate() -> Result<Self, PprqError> {
        validate_params()?;
        let mut buf = [0u8; MASTER_KEY_LEN];
        getrandom::fill(&mut buf).map_err(PprqError::RandomnessFailure)?;
        Ok(Self(buf))
    }

    /// Construct from raw bytes, e.g. key material agreed out-of-band.
    ///
    /// # Errors
    /// Returns [`PprqError::BadKeyLength`] if `raw` is not exactly
    /// [`MASTER_KEY_LEN`] bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, PprqError> {
        raw.try_into()
            .map(Self)
            .map_err(|_| PprqError::BadKeyLength { found: raw.len() })
    }

    /// A deterministic, fixed key for tests. **Never use in production.**
    #[cfg(any(test, feature = "testutils"))]
    pub fn test_key() -> Self {
        Self([0x42u8; MASTER_KEY_LEN])
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// ── Error type ────────────────────────────────────────────────────────────────

/// All error conditions produced by the range-query subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PprqError {
    /// The compile-time scheme constants are mutually inconsistent.
    InvalidParameters {
        /// Which consistency rule was violated.
        detail: &'static str,
    },

    /// Index construction mapped more ciphertexts to one sub-index bucket
    /// than it has slots. Unreachable with the shipped parameters (exactly
    /// as many ciphertexts as buckets), detected for any others.
    BucketOverflow {
        /// Block position being sealed.
        block: usize,
        /// The bucket that would overflow.
        bucket: u8,
    },

    /// The operating system failed to supply random bytes.
    RandomnessFailure(getrandom::Error),

    /// Key material has the wrong size.
    BadKeyLength { found: usize },

    /// Decoding ran out of input.
    Truncated {
        /// Which field was being read.
        step: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A bucket slot byte is neither a valid cipher position nor the
    /// [`EMPTY_SLOT`] sentinel.
    BadSlotSentinel { found: u8 },

    /// A query block names a bucket outside `[0, BUCKET_COUNT)`.
    BadBucketLabel { found: u8 },

    /// A length field disagrees with the fixed layout.
    BadLength {
        what: &'static str,
        found: usize,
    },

    /// Structurally readable bytes that violate a canonical-form rule.
    Malformed(&'static str),

    /// Input remained after the last field of a complete structure.
    TrailingBytes { count: usize },
}

impl core::fmt::Display for PprqError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PprqError::InvalidParameters { detail } => {
                write!(f, "inconsistent scheme parameters: {detail}")
            }
            PprqError::BucketOverflow { block, bucket } => {
                write!(f, "bucket {bucket} overflowed while sealing block {block}")
            }
            PprqError::RandomnessFailure(err) => {
                write!(f, "randomness source failed: {err}")
            }
            PprqError::BadKeyLength { found } => {
                write!(f, "master key must be {MASTER_KEY_LEN} bytes, got {found}")
            }
            PprqError::Truncated {
                step,
                needed,
                remaining,
            } => write!(
                f,
                "input truncated at [{step}]: needed {needed} bytes, {remaining} remain"
            ),
            PprqError::BadSlotSentinel { found } => {
                write!(f, "invalid bucket slot byte {found}")
            }
            PprqError::BadBucketLabel { found } => {
                write!(f, "bucket label {found} out of range")
            }
            PprqError::BadLength { what, found } => {
                write!(f, "bad length {found} for {what}")
            }
            PprqError::Malformed(msg) => write!(f, "malformed input: {msg}"),
            PprqError::TrailingBytes { count } => {
                write!(f, "{count} trailing bytes after a complete structure")
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
