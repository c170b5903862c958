//! # Progress — Page Counters, Periodic Reporter and Stop Flag
//!
//! The sieve itself is single-threaded; `Progress` is the one piece of state
//! shared with another thread. The enumerator bumps the counters after every
//! page and polls `is_stop_requested` there, so a stop takes effect between
//! pages and never mid-page.
//!
//! ## Background Reporter
//!
//! A dedicated thread logs pages done, primes found and throughput every
//! 30 seconds. Shuts down cleanly via the `shutdown` flag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Hook the enumerator calls between pages.
pub trait SieveObserver: Send + Sync {
    /// Page `page` is done; `found` primes have been counted so far.
    fn on_page(&self, page: u64, found: u64);

    fn is_stop_requested(&self) -> bool;
}

pub struct Progress {
    pub pages: AtomicU64,
    pub found: AtomicU64,
    pub current_page: AtomicU64,
    total_pages: AtomicU64,
    start: Instant,
    interval: Duration,
    shutdown: AtomicBool,
    stop_requested: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Self::with_interval(Duration::from_secs(30))
    }

    pub fn with_interval(interval: Duration) -> Arc<Self> {
        Arc::new(Progress {
            pages: AtomicU64::new(0),
            found: AtomicU64::new(0),
            current_page: AtomicU64::new(0),
            total_pages: AtomicU64::new(0),
            start: Instant::now(),
            interval,
            shutdown: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        })
    }

    /// Record how many pages the current plan has, for the status line.
    pub fn set_total_pages(&self, total: u64) {
        self.total_pages.store(total, Ordering::Relaxed);
    }

    pub fn start_reporter(self: &Arc<Self>) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || loop {
            // Sleep in short slices so stop() is noticed promptly
            let deadline = Instant::now() + progress.interval;
            while Instant::now() < deadline {
                if progress.shutdown.load(Ordering::Relaxed) {
                    return;
                }
                thread::sleep(Duration::from_millis(100).min(progress.interval));
            }
            if progress.shutdown.load(Ordering::Relaxed) {
                return;
            }
            progress.print_status();
        })
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let pages = self.pages.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let total = self.total_pages.load(Ordering::Relaxed);
        let current = self.current_page.load(Ordering::Relaxed);
        let rate = if elapsed.as_secs() > 0 {
            pages as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            current_page = current,
            pages,
            total_pages = total,
            rate = format_args!("{:.2} pages/s", rate),
            found,
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "sieve progress"
        );
    }

    /// Stop the background reporter.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Ask the running sieve to stop at the next page boundary.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl SieveObserver for Progress {
    fn on_page(&self, page: u64, found: u64) {
        self.current_page.store(page, Ordering::Relaxed);
        self.pages.fetch_add(1, Ordering::Relaxed);
        self.found.store(found, Ordering::Relaxed);
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }
}
