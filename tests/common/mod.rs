//! Shared test helpers for integration tests: brute-force reference oracles.

#![allow(dead_code)]

/// Primality by trial division up to sqrt(n).
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3u64;
    while d.checked_mul(d).is_some_and(|sq| sq <= n) {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Every prime in `[min, max]` by trial division.
pub fn brute_force(min: u64, max: u64) -> Vec<u64> {
    (min..=max).filter(|&n| is_prime(n)).collect()
}
