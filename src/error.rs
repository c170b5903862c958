//! # Error — Sieve Failure Taxonomy
//!
//! Every failure the sieve can report. None of them are retried: the
//! computation is deterministic, so a second attempt would fail the same way.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// A working buffer (base bitset, base prime list or page bitset) could
    /// not be allocated. The run cannot continue without it.
    #[error("out of memory allocating {what} ({bytes} bytes)")]
    OutOfMemory { what: &'static str, bytes: usize },

    /// `max < min` under the strict range policy.
    #[error("invalid range: max {max} is below min {min}")]
    InvalidRange { min: u64, max: u64 },

    /// Bit index outside a bitset. Indicates broken page or bit arithmetic.
    #[error("bit index {index} out of bounds for bitset of {len} bits")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A 64-bit product the sieve relies on did not fit.
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    /// A stop was requested between pages.
    #[error("sieve cancelled after {pages_done} pages")]
    Cancelled { pages_done: u64 },
}

pub type Result<T> = std::result::Result<T, SieveError>;
