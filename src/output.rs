//! # Output — Rendering Primes, Counts and Run Summaries
//!
//! One value per line, decimal or lowercase hexadecimal without a prefix. The
//! verbose summary is a blank line followed by
//! `{count} primes between {min} and {max}` (always decimal), or a single JSON
//! object when JSON output is selected.
//!
//! `RunSummary::cancelled` is only ever true for library callers that stop a
//! run through `Progress::request_stop`; the binary installs no stop trigger
//! and always runs to completion.

use crate::config::{Range, RangePolicy};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Radix {
    #[default]
    Decimal,
    Hex,
}

/// End-of-run report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub page_bits: u32,
    pub pages: u64,
    pub range_policy: RangePolicy,
    pub elapsed_secs: f64,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn new(range: Range, count: u64) -> Self {
        RunSummary {
            count,
            min: range.min(),
            max: range.max(),
            page_bits: 0,
            pages: 0,
            range_policy: RangePolicy::default(),
            elapsed_secs: 0.0,
            cancelled: false,
        }
    }
}

pub struct PrimeWriter<W: Write> {
    out: W,
    radix: Radix,
}

impl<W: Write> PrimeWriter<W> {
    pub fn new(out: W, radix: Radix) -> Self {
        PrimeWriter { out, radix }
    }

    /// Write one value on its own line.
    pub fn write_value(&mut self, value: u64) -> io::Result<()> {
        match self.radix {
            Radix::Decimal => writeln!(self.out, "{}", value),
            Radix::Hex => writeln!(self.out, "{:x}", value),
        }
    }

    /// Write every prime from `primes`; returns how many were written.
    pub fn write_all<I: IntoIterator<Item = u64>>(&mut self, primes: I) -> io::Result<u64> {
        let mut written = 0;
        for prime in primes {
            self.write_value(prime)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{} primes between {} and {}",
            summary.count, summary.min, summary.max
        )
    }

    pub fn write_summary_json(&mut self, summary: &RunSummary) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, summary)?;
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
