//! # Main — CLI Entry Point
//!
//! `qprimes [OPTIONS] MIN MAX` lists (or counts) every prime in `[MIN, MAX]`
//! on stdout, one per line. Logs go to stderr so stdout stays a clean list.
//!
//! ## Options
//!
//! - `-s` / `-v`: silent (primes only) or verbose (summary line; default).
//! - `-x` / `-d`: hexadecimal or decimal output (default decimal).
//! - `-c`: print the count only.
//! - `--json`: verbose summary as a JSON object.
//! - `--page-bits` / `QPRIMES_PAGE_BITS`: page size cap, log2 bits (default 20).
//! - `--strict-range`: reject `MAX < MIN` instead of clamping `MAX` up.
//!
//! The legacy option word (`qprimes xs 0x1a30 0xfa30`) is still accepted.
//! Usage errors exit with status 1.

mod cli;

use anyhow::Result;
use clap::Parser;
use qprimes::plan::DEFAULT_PAGE_BITS;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "qprimes",
    version,
    about = "Lists all prime numbers between MIN and MAX",
    after_help = "Examples:\n  qprimes 100000000000 100000001000\n  qprimes 0x1a30 0xfa30\n  qprimes -xs 0x1a30 0xfa30"
)]
struct Cli {
    /// Lower bound: unsigned integer below 2^64, '0x' prefix for hexadecimal
    #[arg(value_parser = cli::parse_u64)]
    min: u64,

    /// Upper bound: unsigned integer below 2^64, '0x' prefix for hexadecimal
    #[arg(value_parser = cli::parse_u64)]
    max: u64,

    /// Silent: output just the prime numbers
    #[arg(short, long, overrides_with = "verbose")]
    silent: bool,

    /// Verbose: append a summary line (default)
    #[arg(short, long, overrides_with = "silent")]
    verbose: bool,

    /// Output prime numbers in hexadecimal form
    #[arg(short = 'x', long, overrides_with = "decimal")]
    hex: bool,

    /// Output prime numbers in decimal form (default)
    #[arg(short, long, overrides_with = "hex")]
    decimal: bool,

    /// Print only the number of primes in the range
    #[arg(short, long)]
    count: bool,

    /// Print the summary as a JSON object
    #[arg(long)]
    json: bool,

    /// Page size cap as log2 of bits per page
    #[arg(
        long,
        env = "QPRIMES_PAGE_BITS",
        default_value_t = DEFAULT_PAGE_BITS,
        value_parser = clap::value_parser!(u32).range(1..=32)
    )]
    page_bits: u32,

    /// Reject MAX < MIN instead of raising MAX to MIN
    #[arg(long)]
    strict_range: bool,
}

impl Cli {
    /// `-s` and `-v` override each other, so at most one is set.
    fn is_verbose(&self) -> bool {
        self.verbose || !self.silent
    }

    fn is_hex(&self) -> bool {
        self.hex && !self.decimal
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = cli::expand_legacy_options(std::env::args());
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        // Usage errors exit 1; --help and --version exit 0
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });

    // Structured logging on stderr: LOG_FORMAT=json for machine consumers,
    // RUST_LOG overrides the verbosity-derived default level
    let default_level = if cli.is_verbose() { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    cli::run(&cli)
}
