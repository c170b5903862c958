//! # Base — Odd-Only Sieve of Eratosthenes up to sqrt(max)
//!
//! Builds the base primes every page is sieved with. Only odd integers are
//! stored: bit `i` of the bitset stands for `2i + 1`, which halves memory
//! (one bit per two integers). Bit 0 (the integer 1) is pre-marked.
//!
//! For a range ending at `max` the sieve covers `smax = isqrt(max) + 1`, so for
//! the largest input (`u64::MAX`) it holds 2^31 + 1 bits (256 MiB) and yields
//! every prime below 2^32 — all of which fit in a `u32`.
//!
//! Complexity: O(smax · log log smax) time, O(smax / 16) bytes.

use crate::bitset::BitSet;
use crate::error::{Result, SieveError};
use tracing::debug;

/// Integer square root, exact for every u64.
///
/// Seeds from `f64::sqrt` and corrects with checked arithmetic, since the
/// float estimate can be off by one near 2^64.
#[inline]
pub fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).is_none_or(|sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).is_some_and(|sq| sq <= n) {
        x += 1;
    }
    x
}

/// Upper bound on π(n) used to size the base prime list up front.
fn estimate_prime_count(n: u64) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    (1.26 * nf / nf.ln()) as usize + 1
}

/// Compositeness bitset over the odd integers up to `limit`.
pub struct BaseSieve {
    bits: BitSet,
    limit: u64,
}

impl BaseSieve {
    /// Sieve for a range whose upper bound is `max`: covers `isqrt(max) + 1`.
    pub fn for_max(max: u64) -> Result<Self> {
        Self::build(isqrt(max) + 1)
    }

    /// Sieve every odd integer up to and including `limit`.
    pub fn build(limit: u64) -> Result<Self> {
        let slots = usize::try_from(limit / 2 + 1)
            .map_err(|_| SieveError::Overflow("base sieve size"))?;
        let mut bits = BitSet::allocate(slots, 0, "base sieve bitset")?;
        bits.set(0);

        // n*n <= limit: a composite equal to limit itself must be marked too
        let mut n: u64 = 3;
        while n * n <= limit {
            if !bits.test((n >> 1) as usize) {
                bits.set_stride(((n * n) >> 1) as usize, n as usize);
            }
            n += 2;
        }

        debug!(limit, slots, "base sieve built");
        Ok(BaseSieve { bits, limit })
    }

    /// Largest integer covered (`smax`).
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Extract the ascending base prime list: 2, then every clear odd slot
    /// whose integer does not exceed `limit`.
    pub fn primes(&self) -> Result<BasePrimes> {
        let capacity = estimate_prime_count(self.limit);
        let mut primes: Vec<u32> = Vec::new();
        primes
            .try_reserve(capacity)
            .map_err(|_| SieveError::OutOfMemory {
                what: "base prime list",
                bytes: capacity.saturating_mul(4),
            })?;

        if self.limit >= 2 {
            primes.push(2);
        }
        for i in self.bits.iter_clear() {
            let prime = 2 * i as u64 + 1;
            // The last slot can stand for limit + 1
            if prime > self.limit {
                break;
            }
            let prime = u32::try_from(prime).map_err(|_| SieveError::Overflow("base prime"))?;
            primes.push(prime);
        }
        Ok(BasePrimes {
            primes,
            limit: self.limit,
        })
    }
}

/// Every prime `<= limit`, ascending. Immutable once extracted.
#[derive(Clone, Debug)]
pub struct BasePrimes {
    primes: Vec<u32>,
    limit: u64,
}

impl BasePrimes {
    /// Build the base prime list for a range ending at `max`. The bitset is
    /// dropped once the list is extracted.
    pub fn for_max(max: u64) -> Result<Self> {
        BaseSieve::for_max(max)?.primes()
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.primes
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Index of the first base prime `>= value`.
    pub fn lower_bound(&self, value: u64) -> usize {
        self.primes.partition_point(|&p| (p as u64) < value)
    }

    /// The base primes inside `[min, max]`.
    pub fn in_range(&self, min: u64, max: u64) -> &[u32] {
        let start = self.lower_bound(min);
        let end = self.primes.partition_point(|&p| (p as u64) <= max);
        &self.primes[start..end.max(start)]
    }
}
