//! Lightweight performance timing utilities.
//!
//! Counters are always cheap to update; reporting is gated behind
//! `enable_timing()` or the `FF_TIMING` environment variable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("FF_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Create and start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and add the elapsed time to `acc`.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        acc.record(self.elapsed_seconds());
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    /// Create a new accumulating timer.
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    /// Reset the timer.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Counters for the time-stepping pipeline.
pub mod step_timing {
    use super::AccumulatingTimer;

    /// Matrix assembly (only when the cached operator is rebuilt)
    pub static MATRIX_ASSEMBLY: AccumulatingTimer = AccumulatingTimer::new();
    /// Right-hand side assembly (every solve, every Picard iteration)
    pub static RHS_ASSEMBLY: AccumulatingTimer = AccumulatingTimer::new();
    /// LU factorizations
    pub static FACTORIZATION: AccumulatingTimer = AccumulatingTimer::new();
    /// Triangular solves against a factorization
    pub static SOLVE: AccumulatingTimer = AccumulatingTimer::new();

    /// Reset all step timers.
    pub fn reset_all() {
        MATRIX_ASSEMBLY.reset();
        RHS_ASSEMBLY.reset();
        FACTORIZATION.reset();
        SOLVE.reset();
    }

    /// Print step timing summary.
    pub fn print_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        println!("\n=== Time-Stepping Breakdown ===");
        for (label, timer) in [
            ("matrix assembly", &MATRIX_ASSEMBLY),
            ("rhs assembly", &RHS_ASSEMBLY),
            ("factorization", &FACTORIZATION),
            ("solve", &SOLVE),
        ] {
            let count = timer.count();
            if count > 0 {
                println!(
                    "{:<16} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
            }
        }
        println!("===============================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let timer = AccumulatingTimer::new();
        timer.record(0.5);
        timer.record(1.5);
        assert_eq!(timer.count(), 2);
        assert!((timer.total_seconds() - 2.0).abs() < 1e-6);
        assert!((timer.average_seconds() - 1.0).abs() < 1e-6);

        timer.reset();
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average_seconds(), 0.0);
    }

    #[test]
    fn timer_records_into_accumulator() {
        let acc = AccumulatingTimer::new();
        let t = Timer::start();
        t.stop_into(&acc);
        assert_eq!(acc.count(), 1);
    }
}
