//! # Plan — Page Size Selection and Page Partitioning
//!
//! Pages are aligned, power-of-two windows: page `pg` covers
//! `[pg << bits, (pg + 1) << bits)`. The size trades per-page overhead (one
//! modulo per base prime) against memory for the page bitset. The default cap
//! is 2^20 bits; ranges narrower than that shrink the page to the smallest
//! power of two covering `max - min`, never below 2^1.

/// Default page size exponent: 2^20 bits (128 KiB) per page.
pub const DEFAULT_PAGE_BITS: u32 = 20;

/// Largest accepted page size exponent.
pub const MAX_PAGE_BITS: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePlan {
    /// log2 of the page size in bits.
    pub page_bits: u32,
    /// Index of the page containing `min`.
    pub first_page: u64,
    /// Index of the page containing `max`.
    pub last_page: u64,
}

impl PagePlan {
    /// Plan pages for `[min, max]` with the page size capped at `2^cap_bits`.
    ///
    /// `min <= max` is expected; `cap_bits` is clamped to `1..=MAX_PAGE_BITS`.
    pub fn new(min: u64, max: u64, cap_bits: u32) -> Self {
        let cap_bits = cap_bits.clamp(1, MAX_PAGE_BITS);
        let span = max.saturating_sub(min);
        let page_bits = if span < (1u64 << cap_bits) {
            // span < 2^32 here, so next_power_of_two cannot overflow
            span.next_power_of_two().trailing_zeros().max(1)
        } else {
            cap_bits
        };
        PagePlan {
            page_bits,
            first_page: min >> page_bits,
            last_page: max >> page_bits,
        }
    }

    /// Page size in bits (one bit per integer).
    pub fn page_size(&self) -> u64 {
        1u64 << self.page_bits
    }

    /// Number of pages in the plan.
    pub fn page_count(&self) -> u64 {
        self.last_page - self.first_page + 1
    }

    /// First integer of page `pg`. `None` if it does not fit in a u64.
    pub fn page_origin(&self, pg: u64) -> Option<u64> {
        pg.checked_mul(self.page_size())
    }

    /// Index of the page containing `value`.
    pub fn page_of(&self, value: u64) -> u64 {
        value >> self.page_bits
    }
}
