//! # Engine — Paged Composite Marking
//!
//! Sieves one aligned page at a time with the base primes. The page bitset
//! has one bit per integer (bit `j` ↔ `origin + j`); wasting the even bits
//! keeps offset arithmetic trivial. A single buffer is owned by the engine and
//! refilled for every page, never reallocated.
//!
//! ## Per-page steps
//!
//! 1. Refill with `EVEN_BITS`: even offsets start marked. Page origins are
//!    multiples of the page size (≥ 2), so offset parity equals integer parity.
//! 2. For each odd base prime `p` with `p * p <= hi`, mark the odd multiples of
//!    `p` starting from the first multiple at or after the origin
//!    (`j0 = (p - origin mod p) mod p`, moved to the next odd multiple when
//!    even), stride `2p`. Primes with `p * p > hi` cannot be the smallest
//!    factor of any composite `<= hi` and are skipped.
//! 3. Clear bits inside the page window are primes.
//!
//! The window of a page never reaches below the emission floor
//! (`smax + 1`), so base primes left unmarked by step 2 are never reported
//! from a page; they come from the base list only.

use crate::base::BasePrimes;
use crate::bitset::{BitSet, EVEN_BITS};
use crate::error::{Result, SieveError};
use crate::plan::PagePlan;

/// The part of one page that is scanned: offsets `first..=last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub origin: u64,
    pub first: usize,
    pub last: usize,
}

impl PageWindow {
    /// Integer at `offset` within the page.
    #[inline]
    pub fn value(&self, offset: usize) -> u64 {
        self.origin + offset as u64
    }

    /// Highest integer in the window.
    pub fn hi(&self) -> u64 {
        self.value(self.last)
    }
}

pub struct PageSieveEngine {
    base: BasePrimes,
    plan: PagePlan,
    page: BitSet,
    loaded: Option<u64>,
}

impl PageSieveEngine {
    pub fn new(base: BasePrimes, plan: PagePlan) -> Result<Self> {
        // Every page origin up to the last one fits once the last one does
        plan.page_origin(plan.last_page)
            .ok_or(SieveError::Overflow("last page origin"))?;
        let size = usize::try_from(plan.page_size())
            .map_err(|_| SieveError::Overflow("page size"))?;
        let page = BitSet::allocate(size, EVEN_BITS, "page bitset")?;
        Ok(PageSieveEngine {
            base,
            plan,
            page,
            loaded: None,
        })
    }

    pub fn base(&self) -> &BasePrimes {
        &self.base
    }

    pub fn plan(&self) -> &PagePlan {
        &self.plan
    }

    /// Window of page `pg` clipped to `[floor, max]`, or `None` if the page
    /// holds nothing in that interval.
    pub fn window(&self, pg: u64, floor: u64, max: u64) -> Option<PageWindow> {
        debug_assert!(pg <= self.plan.last_page);
        let origin = pg << self.plan.page_bits;
        let end = origin.saturating_add(self.plan.page_size() - 1);
        let lo = floor.max(origin);
        let hi = max.min(end);
        if lo > hi {
            return None;
        }
        Some(PageWindow {
            page: pg,
            origin,
            first: (lo - origin) as usize,
            last: (hi - origin) as usize,
        })
    }

    /// Mark every composite in the window's page up to `window.hi()`.
    ///
    /// Offsets are below the page size, which `new` has already checked fits
    /// in a `usize`.
    pub fn sieve(&mut self, window: &PageWindow) {
        self.page.fill(EVEN_BITS);
        let hi = window.hi();
        let size = self.plan.page_size();

        for &p in self.base.as_slice() {
            let p = p as u64;
            if p == 2 {
                continue;
            }
            match p.checked_mul(p) {
                Some(square) if square <= hi => {}
                _ => break,
            }
            let mut j = (p - window.origin % p) % p;
            if j % 2 == 0 {
                j += p;
            }
            if j < size {
                self.page.set_stride(j as usize, 2 * p as usize);
            }
        }

        self.loaded = Some(window.page);
    }

    /// First unmarked offset in `from..=window.last`.
    pub fn next_prime(&self, window: &PageWindow, from: usize) -> Option<usize> {
        debug_assert_eq!(self.loaded, Some(window.page));
        let from = from.max(window.first);
        self.page.next_clear(from).filter(|&j| j <= window.last)
    }

    /// Number of unmarked offsets in the window.
    pub fn count(&self, window: &PageWindow) -> u64 {
        debug_assert_eq!(self.loaded, Some(window.page));
        self.page.count_clear(window.first..window.last + 1) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(min: u64, max: u64, cap: u32) -> PageSieveEngine {
        let base = BasePrimes::for_max(max).unwrap();
        let plan = PagePlan::new(min, max, cap);
        PageSieveEngine::new(base, plan).unwrap()
    }

    fn collect(engine: &mut PageSieveEngine, window: PageWindow) -> Vec<u64> {
        engine.sieve(&window);
        let mut out = Vec::new();
        let mut cursor = window.first;
        while let Some(j) = engine.next_prime(&window, cursor) {
            out.push(window.value(j));
            cursor = j + 1;
        }
        out
    }

    #[test]
    fn two_small_pages() {
        let mut e = engine(100, 200, 20);
        let plan = *e.plan();
        assert_eq!(plan.page_bits, 7);
        assert_eq!((plan.first_page, plan.last_page), (0, 1));
        let floor = (e.base().limit() + 1).max(100);

        let w0 = e.window(0, floor, 200).unwrap();
        assert_eq!((w0.first, w0.last), (100, 127));
        assert_eq!(collect(&mut e, w0), vec![101, 103, 107, 109, 113, 127]);

        let w1 = e.window(1, floor, 200).unwrap();
        assert_eq!((w1.first, w1.last), (0, 72));
        assert_eq!(
            collect(&mut e, w1),
            vec![131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193, 197, 199]
        );
    }

    #[test]
    fn window_clips_to_floor_and_max() {
        let e = engine(0, 1000, 6);
        // 64-bit pages: page 1 is [64, 128)
        let w = e.window(1, 100, 1000).unwrap();
        assert_eq!((w.origin, w.first, w.last), (64, 36, 63));
        let w = e.window(15, 0, 1000).unwrap();
        assert_eq!((w.origin, w.first, w.last), (960, 0, 40));
        assert_eq!(e.window(0, 100, 1000), None);
    }

    #[test]
    fn marks_match_trial_division() {
        let mut e = engine(1000, 5000, 8);
        let floor = e.base().limit() + 1;
        let plan = *e.plan();
        let mut found = Vec::new();
        for pg in plan.first_page..=plan.last_page {
            if let Some(w) = e.window(pg, floor.max(1000), 5000) {
                found.extend(collect(&mut e, w));
            }
        }
        let expected: Vec<u64> = (1000..=5000u64)
            .filter(|&n| (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0))
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn count_agrees_with_scan() {
        let mut e = engine(0, 100_000, 12);
        let floor = e.base().limit() + 1;
        let plan = *e.plan();
        for pg in plan.first_page..=plan.last_page {
            if let Some(w) = e.window(pg, floor, 100_000) {
                let listed = collect(&mut e, w).len() as u64;
                assert_eq!(e.count(&w), listed, "page {}", pg);
            }
        }
    }

    #[test]
    fn buffer_is_reset_between_pages() {
        let mut e = engine(0, 4096, 10);
        let floor = e.base().limit() + 1;
        let w2 = e.window(2, floor, 4096).unwrap();
        let first = collect(&mut e, w2);
        let w3 = e.window(3, floor, 4096).unwrap();
        collect(&mut e, w3);
        assert_eq!(collect(&mut e, w2), first);
    }

    #[test]
    fn page_at_top_of_u64() {
        // Base primes only up to 2^20 keep this cheap; the window logic is
        // what is exercised near 2^64.
        let plan = PagePlan::new(u64::MAX - 100, u64::MAX, 20);
        let base = BasePrimes::for_max(1 << 40).unwrap();
        let e = PageSieveEngine::new(base, plan).unwrap();
        let w = e.window(plan.last_page, u64::MAX - 100, u64::MAX).unwrap();
        assert_eq!(w.hi(), u64::MAX);
        assert_eq!(w.last, 127);
        assert_eq!(w.first, 27);
    }
}
