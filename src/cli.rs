//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: argument helpers and
//! the run itself (sieve, stream to stdout, summary).

use anyhow::{Context, Result};
use qprimes::output::{PrimeWriter, Radix, RunSummary};
use qprimes::progress::Progress;
use qprimes::{PrimeEnumerator, RangePolicy, SieveConfig};
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info};

use super::Cli;

/// Option letters understood in the legacy option word.
const LEGACY_LETTERS: &[char] = &['s', 'v', 'd', 'x', 'c'];

/// Parse an unsigned 64-bit bound: decimal, or hexadecimal after `0x`/`0X`.
pub fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("'{}' is not an unsigned 64-bit integer: {}", s, e))
}

/// Rewrite a leading option word (`xs`, `vd`, ...) into short flags.
///
/// A first argument starting with a lowercase letter is an option word; the
/// letters `s v d x c` become flags and any other letter is ignored.
pub fn expand_legacy_options<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    let mut args: Vec<String> = args.into_iter().collect();
    let is_word = args
        .get(1)
        .and_then(|a| a.chars().next())
        .is_some_and(|c| c.is_ascii_lowercase());
    if is_word {
        let word = args.remove(1);
        let letters: String = word.chars().filter(|c| LEGACY_LETTERS.contains(c)).collect();
        if !letters.is_empty() {
            args.insert(1, format!("-{}", letters));
        }
    }
    args
}

/// Stops the progress reporter and joins its thread when dropped, so early
/// returns cannot leave it running.
struct ReporterGuard {
    progress: Arc<Progress>,
    handle: Option<JoinHandle<()>>,
}

impl ReporterGuard {
    fn start(progress: &Arc<Progress>, enabled: bool) -> Self {
        ReporterGuard {
            progress: Arc::clone(progress),
            handle: enabled.then(|| progress.start_reporter()),
        }
    }
}

impl Drop for ReporterGuard {
    fn drop(&mut self) {
        self.progress.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A closed stdout (`qprimes ... | head`) ends the output early but is not a
/// failure.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

/// Sieve the range and write the result to stdout.
pub fn run(cli: &Cli) -> Result<()> {
    let policy = if cli.strict_range {
        RangePolicy::Strict
    } else {
        RangePolicy::Clamp
    };
    let config = SieveConfig {
        page_bits: cli.page_bits,
        range_policy: policy,
    };

    let progress = Progress::new();
    let enumerator = PrimeEnumerator::from_bounds(cli.min, cli.max, &config)
        .context("preparing the sieve")?
        .with_observer(progress.clone());
    let range = enumerator.range();
    let plan = *enumerator.plan();
    progress.set_total_pages(plan.page_count());

    let radix = if cli.is_hex() { Radix::Hex } else { Radix::Decimal };
    let stdout = io::stdout();
    let writer = PrimeWriter::new(BufWriter::new(stdout.lock()), radix);

    let guard = ReporterGuard::start(&progress, cli.is_verbose());
    let result = emit(cli, enumerator, writer, |count, cancelled| RunSummary {
        page_bits: plan.page_bits,
        pages: plan.page_count(),
        range_policy: config.range_policy,
        elapsed_secs: progress.elapsed().as_secs_f64(),
        cancelled,
        ..RunSummary::new(range, count)
    });
    drop(guard);

    match result {
        Err(e) if is_broken_pipe(&e) => {
            debug!("stdout closed, stopping early");
            Ok(())
        }
        other => other,
    }
}

/// List or count, then append the summary when verbose.
fn emit<W: Write>(
    cli: &Cli,
    enumerator: PrimeEnumerator,
    mut writer: PrimeWriter<W>,
    summarize: impl FnOnce(u64, bool) -> RunSummary,
) -> Result<()> {
    let (count, cancelled) = if cli.count {
        let count = enumerator.count().context("counting primes")?;
        writer.write_value(count)?;
        (count, false)
    } else {
        let mut primes = enumerator.primes();
        writer.write_all(primes.by_ref())?;
        (primes.found(), primes.is_cancelled())
    };

    if cli.is_verbose() {
        let summary = summarize(count, cancelled);
        if cli.json {
            writer.write_summary_json(&summary)?;
        } else {
            writer.write_summary(&summary)?;
        }
        info!(count, elapsed_secs = summary.elapsed_secs, "sieve complete");
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use qprimes::SieveError;
    use std::time::Duration;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> Cli {
        Cli::try_parse_from(args(list)).unwrap()
    }

    /// Writer whose reader has gone away.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn emit_to<W: Write>(cli: &Cli, out: W) -> Result<()> {
        let enumerator =
            PrimeEnumerator::from_bounds(cli.min, cli.max, &SieveConfig::default()).unwrap();
        let range = enumerator.range();
        emit(cli, enumerator, PrimeWriter::new(out, Radix::Decimal), |count, _| {
            RunSummary::new(range, count)
        })
    }

    #[test]
    fn emit_writes_list_and_summary() {
        let mut out = Vec::new();
        emit_to(&parse(&["qprimes", "10", "30"]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "11\n13\n17\n19\n23\n29\n\n6 primes between 10 and 30\n"
        );
    }

    #[test]
    fn closed_stdout_is_reported_as_broken_pipe() {
        let err = emit_to(&parse(&["qprimes", "-s", "0", "1000"]), ClosedPipe).unwrap_err();
        assert!(is_broken_pipe(&err));
        let err = emit_to(&parse(&["qprimes", "-c", "0", "1000"]), ClosedPipe).unwrap_err();
        assert!(is_broken_pipe(&err));
    }

    #[test]
    fn sieve_errors_are_not_broken_pipes() {
        let err = anyhow::Error::new(SieveError::InvalidRange { min: 2, max: 1 });
        assert!(!is_broken_pipe(&err));
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!is_broken_pipe(&err));
    }

    #[test]
    fn reporter_guard_stops_thread_on_drop() {
        let progress = Progress::with_interval(Duration::from_secs(3600));
        let guard = ReporterGuard::start(&progress, true);
        assert!(guard.handle.is_some());
        // Dropping joins the thread; a reporter still sleeping would hang here
        drop(guard);
        assert_eq!(Arc::strong_count(&progress), 1);

        let idle = ReporterGuard::start(&progress, false);
        assert!(idle.handle.is_none());
    }

    #[test]
    fn parse_decimal_and_hex() {
        assert_eq!(parse_u64("0"), Ok(0));
        assert_eq!(parse_u64("100000000000"), Ok(100_000_000_000));
        assert_eq!(parse_u64("0x1a30"), Ok(0x1a30));
        assert_eq!(parse_u64("0XFA30"), Ok(0xfa30));
        assert_eq!(parse_u64("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(parse_u64("0xffffffffffffffff"), Ok(u64::MAX));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_u64("").is_err());
        assert!(parse_u64("-5").is_err());
        assert!(parse_u64("0x").is_err());
        assert!(parse_u64("12abc").is_err());
        assert!(parse_u64("18446744073709551616").is_err());
    }

    #[test]
    fn legacy_word_becomes_short_flags() {
        assert_eq!(
            expand_legacy_options(args(&["qprimes", "xs", "0x1a30", "0xfa30"])),
            args(&["qprimes", "-xs", "0x1a30", "0xfa30"])
        );
    }

    #[test]
    fn legacy_word_drops_unknown_letters() {
        assert_eq!(
            expand_legacy_options(args(&["qprimes", "qz", "1", "2"])),
            args(&["qprimes", "1", "2"])
        );
        assert_eq!(
            expand_legacy_options(args(&["qprimes", "xqd", "1", "2"])),
            args(&["qprimes", "-xd", "1", "2"])
        );
    }

    #[test]
    fn numeric_and_flag_arguments_untouched() {
        let plain = args(&["qprimes", "10", "20"]);
        assert_eq!(expand_legacy_options(plain.clone()), plain);
        let flagged = args(&["qprimes", "-x", "10", "20"]);
        assert_eq!(expand_legacy_options(flagged.clone()), flagged);
        let bare = args(&["qprimes"]);
        assert_eq!(expand_legacy_options(bare.clone()), bare);
    }
}
