//! # Enumerator — Base Sieve, Base-Prime Emission, then Pages
//!
//! Drives a whole run over `[min, max]`:
//!
//! 1. Build the base primes up to `smax = isqrt(max) + 1`.
//! 2. Report the base primes that fall in `[min, max]` (2 included).
//! 3. Plan pages and sieve each one, reporting primes `>= floor`, where
//!    `floor = max(min, smax + 1)`.
//!
//! Every prime has exactly one emission point: primes `<= smax` come from the
//! base list, larger ones from a page. Pages lying entirely below the floor
//! are never sieved. The output is strictly ascending because base primes are
//! all below the floor and pages are visited in ascending order.
//!
//! Listing (`Primes`) and counting (`PrimeEnumerator::count`) share the
//! planning, windows and marking; counting only swaps the per-page scan for
//! a popcount.

use crate::base::BasePrimes;
use crate::config::{Range, SieveConfig};
use crate::engine::{PageSieveEngine, PageWindow};
use crate::error::{Result, SieveError};
use crate::plan::PagePlan;
use crate::progress::SieveObserver;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PrimeEnumerator {
    range: Range,
    engine: PageSieveEngine,
    observer: Option<Arc<dyn SieveObserver>>,
}

impl PrimeEnumerator {
    /// Normalize `[min, max]` under `config.range_policy`, then plan the run.
    pub fn from_bounds(min: u64, max: u64, config: &SieveConfig) -> Result<Self> {
        let range = Range::new(min, max, config.range_policy)?;
        Self::new(range, config)
    }

    /// Plan a run over an already normalized range.
    pub fn new(range: Range, config: &SieveConfig) -> Result<Self> {
        let base = BasePrimes::for_max(range.max())?;
        let plan = PagePlan::new(range.min(), range.max(), config.page_bits);
        let engine = PageSieveEngine::new(base, plan)?;

        info!(
            min = range.min(),
            max = range.max(),
            smax = engine.base().limit(),
            base_primes = engine.base().len(),
            page_bits = plan.page_bits,
            pages = plan.page_count(),
            "sieve planned"
        );

        Ok(PrimeEnumerator {
            range,
            engine,
            observer: None,
        })
    }

    /// Report page progress to `observer` and honor its stop requests.
    pub fn with_observer(mut self, observer: Arc<dyn SieveObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn plan(&self) -> &PagePlan {
        self.engine.plan()
    }

    /// `smax`: the largest integer covered by the base sieve.
    pub fn base_limit(&self) -> u64 {
        self.engine.base().limit()
    }

    /// Lowest value a page may report.
    pub fn floor(&self) -> u64 {
        self.range.min().max(self.base_limit() + 1)
    }

    /// Pages that can hold anything `>= floor`, or `None` if there are none.
    fn page_span(&self) -> Option<(u64, u64)> {
        let floor = self.floor();
        if floor > self.range.max() {
            return None;
        }
        let plan = self.engine.plan();
        Some((plan.page_of(floor), plan.last_page))
    }

    fn base_span(&self) -> (usize, usize) {
        let base = self.engine.base();
        let start = base.lower_bound(self.range.min());
        let end = start + base.in_range(self.range.min(), self.range.max()).len();
        (start, end)
    }

    /// Lazily yield every prime in the range, ascending.
    pub fn primes(self) -> Primes {
        let (base_pos, base_end) = self.base_span();
        let (next_page, last_page) = match self.page_span() {
            Some(span) => span,
            // Empty page span: next_page > last_page
            None => (1, 0),
        };
        Primes {
            floor: self.floor(),
            base_pos,
            base_end,
            next_page,
            last_page,
            window: None,
            cursor: 0,
            found: 0,
            pages_done: 0,
            cancelled: false,
            enumerator: self,
        }
    }

    /// Count the primes in the range without listing them.
    pub fn count(mut self) -> Result<u64> {
        let (base_pos, base_end) = self.base_span();
        let mut found = (base_end - base_pos) as u64;
        let mut pages_done = 0u64;

        if let Some((first, last)) = self.page_span() {
            let floor = self.floor();
            let max = self.range.max();
            for pg in first..=last {
                if self.stop_requested() {
                    warn!(pages_done, "sieve cancelled");
                    return Err(SieveError::Cancelled { pages_done });
                }
                if let Some(window) = self.engine.window(pg, floor, max) {
                    self.engine.sieve(&window);
                    found += self.engine.count(&window);
                }
                pages_done += 1;
                if let Some(observer) = &self.observer {
                    observer.on_page(pg, found);
                }
            }
        }

        debug!(found, pages_done, "count finished");
        Ok(found)
    }

    fn stop_requested(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|observer| observer.is_stop_requested())
    }
}

/// Iterator over the primes of one run. Owns the engine and its page buffer.
pub struct Primes {
    enumerator: PrimeEnumerator,
    floor: u64,
    base_pos: usize,
    base_end: usize,
    next_page: u64,
    last_page: u64,
    window: Option<PageWindow>,
    cursor: usize,
    found: u64,
    pages_done: u64,
    cancelled: bool,
}

impl Primes {
    /// Primes yielded so far.
    pub fn found(&self) -> u64 {
        self.found
    }

    /// Pages fully scanned so far.
    pub fn pages_done(&self) -> u64 {
        self.pages_done
    }

    /// True if a stop request ended the run early.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Sieve the next page with a non-empty window. Returns false when the
    /// run is over.
    fn load_next_page(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        let max = self.enumerator.range.max();
        while self.next_page <= self.last_page {
            if self.enumerator.stop_requested() {
                warn!(pages_done = self.pages_done, "sieve cancelled");
                self.cancelled = true;
                return false;
            }
            let pg = self.next_page;
            self.next_page += 1;
            if let Some(window) = self.enumerator.engine.window(pg, self.floor, max) {
                self.enumerator.engine.sieve(&window);
                self.cursor = window.first;
                self.window = Some(window);
                return true;
            }
            self.finish_page(pg);
        }
        false
    }

    fn finish_page(&mut self, pg: u64) {
        self.pages_done += 1;
        if let Some(observer) = &self.enumerator.observer {
            observer.on_page(pg, self.found);
        }
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.base_pos < self.base_end {
            let prime = self.enumerator.engine.base().as_slice()[self.base_pos] as u64;
            self.base_pos += 1;
            self.found += 1;
            return Some(prime);
        }

        loop {
            if let Some(window) = self.window {
                if let Some(j) = self.enumerator.engine.next_prime(&window, self.cursor) {
                    self.cursor = j + 1;
                    self.found += 1;
                    return Some(window.value(j));
                }
                self.window = None;
                self.finish_page(window.page);
            }
            if !self.load_next_page() {
                return None;
            }
        }
    }
}

impl FusedIterator for Primes {}
