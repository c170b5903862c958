//! # BitSet — Packed Compositeness Flags
//!
//! Fixed-length bitmap packed into u64 words, shared by the base sieve and the
//! page engine. A set bit means "composite (or not yet proven prime)"; a clear
//! bit means "prime". What integer a bit stands for is decided by the owner:
//!
//! - base sieve: bit `i` ↔ odd integer `2i + 1`
//! - page engine: bit `j` ↔ integer `page_origin + j`
//!
//! Bits past `len` in the last word are kept set at all times, so scans over
//! clear bits never have to special-case the tail.
//!
//! Allocation goes through `try_reserve_exact`, so an oversized request comes
//! back as `SieveError::OutOfMemory` instead of aborting the process.

use crate::error::{Result, SieveError};
use std::ops::Range;

/// Every even bit set: marks even offsets of a page (page origins are even).
pub const EVEN_BITS: u64 = 0x5555_5555_5555_5555;

#[derive(Clone, Debug)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Create a bitset of `len` bits, all clear.
    pub fn new(len: usize) -> Result<Self> {
        Self::allocate(len, 0, "bitset")
    }

    /// Create a bitset of `len` bits with every word initialized to `pattern`.
    ///
    /// `what` names the buffer in the `OutOfMemory` error.
    pub fn allocate(len: usize, pattern: u64, what: &'static str) -> Result<Self> {
        let num_words = len.div_ceil(64);
        let mut words = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| SieveError::OutOfMemory {
                what,
                bytes: num_words.saturating_mul(8),
            })?;
        words.resize(num_words, pattern);
        let mut bits = BitSet { words, len };
        bits.mark_tail();
        Ok(bits)
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if bit `index` is set (composite).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub fn test(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "BitSet index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Set bit `index` (mark composite).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(
            index < self.len,
            "BitSet index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    /// Set every `step`-th bit from `start` to the end of the set.
    ///
    /// # Panics
    /// Panics if `step` is zero.
    #[inline]
    pub fn set_stride(&mut self, start: usize, step: usize) {
        assert!(step > 0, "BitSet stride must be non-zero");
        let mut i = start;
        while i < self.len {
            self.words[i / 64] |= 1u64 << (i % 64);
            i += step;
        }
    }

    /// Checked variant of [`BitSet::test`].
    pub fn try_test(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.test(index))
    }

    /// Checked variant of [`BitSet::set`].
    pub fn try_set(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.set(index);
        Ok(())
    }

    /// Clear every bit (all prime).
    pub fn clear_all(&mut self) {
        self.fill(0);
    }

    /// Overwrite every word with `pattern`. Reuses the existing buffer.
    pub fn fill(&mut self, pattern: u64) {
        self.words.fill(pattern);
        self.mark_tail();
    }

    /// Index of the first clear bit at or after `from`.
    pub fn next_clear(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        let mut wi = from / 64;
        let mut word = !self.words[wi] & (u64::MAX << (from % 64));
        loop {
            if word != 0 {
                let index = wi * 64 + word.trailing_zeros() as usize;
                return (index < self.len).then_some(index);
            }
            wi += 1;
            if wi == self.words.len() {
                return None;
            }
            word = !self.words[wi];
        }
    }

    /// Number of clear bits in `range`, via POPCNT on masked words.
    ///
    /// # Panics
    /// Panics if `range.end > len`.
    pub fn count_clear(&self, range: Range<usize>) -> usize {
        assert!(
            range.end <= self.len,
            "BitSet range end out of bounds: {} > {}",
            range.end,
            self.len
        );
        if range.start >= range.end {
            return 0;
        }
        let first = range.start / 64;
        let last = (range.end - 1) / 64;
        let mut total = 0;
        for wi in first..=last {
            let mut mask = u64::MAX;
            if wi == first {
                mask &= u64::MAX << (range.start % 64);
            }
            if wi == last {
                mask &= u64::MAX >> (63 - (range.end - 1) % 64);
            }
            total += (!self.words[wi] & mask).count_ones() as usize;
        }
        total
    }

    /// Iterate over the indices of all clear bits in ascending order.
    pub fn iter_clear(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| ClearBits {
            word: !word,
            base: wi * 64,
        })
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(SieveError::IndexOutOfBounds {
                index,
                len: self.len,
            })
        }
    }

    fn mark_tail(&mut self) {
        let extra = self.words.len() * 64 - self.len;
        if extra > 0 {
            if let Some(last) = self.words.last_mut() {
                *last |= u64::MAX << (64 - extra);
            }
        }
    }
}

/// Iterator over the set bits of an inverted word (the clear bits of the source word).
struct ClearBits {
    word: u64,
    base: usize,
}

impl Iterator for ClearBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(self.base + tz)
    }
}
