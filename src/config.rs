//! # Config — Range Normalization and Sieve Tunables

use crate::error::{Result, SieveError};
use crate::plan::DEFAULT_PAGE_BITS;
use serde::{Deserialize, Serialize};

/// How to treat a range given with `max < min`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Raise `max` to `min`, leaving the single value `min`.
    #[default]
    Clamp,
    /// Reject with `SieveError::InvalidRange`.
    Strict,
}

/// Closed range `[min, max]` with `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    min: u64,
    max: u64,
}

impl Range {
    /// Normalize `(min, max)` under `policy`.
    pub fn new(min: u64, max: u64, policy: RangePolicy) -> Result<Self> {
        if max >= min {
            return Ok(Range { min, max });
        }
        match policy {
            RangePolicy::Clamp => Ok(Range { min, max: min }),
            RangePolicy::Strict => Err(SieveError::InvalidRange { min, max }),
        }
    }

    /// Clamping constructor; never fails.
    pub fn clamped(min: u64, max: u64) -> Self {
        Range {
            min,
            max: max.max(min),
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Upper bound on log2 of the page size in bits.
    pub page_bits: u32,
    pub range_policy: RangePolicy,
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            page_bits: DEFAULT_PAGE_BITS,
            range_policy: RangePolicy::Clamp,
        }
    }
}
