pub mod base;
pub mod bitset;
pub mod config;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod output;
pub mod plan;
pub mod progress;

pub use config::{Range, RangePolicy, SieveConfig};
pub use enumerator::{PrimeEnumerator, Primes};
pub use error::SieveError;

/// Every prime in `[min, max]`, ascending, each exactly once.
///
/// `max < min` is clamped to the single value `min`. The base sieve and the
/// page buffer are allocated up front; iteration itself cannot fail.
pub fn enumerate_primes(min: u64, max: u64) -> Result<Primes, SieveError> {
    Ok(PrimeEnumerator::from_bounds(min, max, &SieveConfig::default())?.primes())
}

/// Number of primes in `[min, max]`. Same sieve as [`enumerate_primes`],
/// with per-page popcounts in place of listing.
pub fn count_primes(min: u64, max: u64) -> Result<u64, SieveError> {
    PrimeEnumerator::from_bounds(min, max, &SieveConfig::default())?.count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_small_range() {
        let primes: Vec<u64> = enumerate_primes(10, 50).unwrap().collect();
        assert_eq!(primes, vec![11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]);
    }

    #[test]
    fn count_matches_enumerate() {
        assert_eq!(count_primes(0, 1_000_000).unwrap(), 78_498);
        assert_eq!(enumerate_primes(0, 1_000_000).unwrap().count(), 78_498);
    }

    #[test]
    fn page_boundary_at_default_size() {
        let lo = (1u64 << 20) - 5;
        let hi = (1u64 << 20) + 5;
        let primes: Vec<u64> = enumerate_primes(lo, hi).unwrap().collect();
        assert_eq!(primes, vec![1_048_571, 1_048_573]);
        assert_eq!(count_primes(lo, hi).unwrap(), 2);
    }

    #[test]
    fn identical_runs_are_identical() {
        let a: Vec<u64> = enumerate_primes(123_456, 234_567).unwrap().collect();
        let b: Vec<u64> = enumerate_primes(123_456, 234_567).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn regression_above_1e11() {
        let min = 100_000_000_000;
        assert_eq!(count_primes(min, min + 1000).unwrap(), 47);
        assert_eq!(enumerate_primes(min, min + 1000).unwrap().count(), 47);
    }
}
