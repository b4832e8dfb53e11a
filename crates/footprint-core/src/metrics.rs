//! Global atomic counters for FootprintGuard.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single `tracing::info!`
//! event, e.g. at the end of a scan.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations and no locking.
pub struct Metrics {
    scans_completed: AtomicU64,
    provider_failures: AtomicU64,
    judgment_calls: AtomicU64,
    judgment_fallbacks: AtomicU64,
    revisions: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            scans_completed: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            judgment_calls: AtomicU64::new(0),
            judgment_fallbacks: AtomicU64::new(0),
            revisions: AtomicU64::new(0),
        }
    }

    pub fn inc_scans_completed(&self) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "scans_completed", "counter incremented");
    }

    pub fn inc_provider_failures(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "provider_failures", "counter incremented");
    }

    pub fn inc_judgment_calls(&self) {
        self.judgment_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judgment_calls", "counter incremented");
    }

    pub fn inc_judgment_fallbacks(&self) {
        self.judgment_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "judgment_fallbacks", "counter incremented");
    }

    pub fn inc_revisions(&self) {
        self.revisions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "revisions", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            scans_completed = self.scans_completed(),
            provider_failures = self.provider_failures(),
            judgment_calls = self.judgment_calls(),
            judgment_fallbacks = self.judgment_fallbacks(),
            revisions = self.revisions(),
        );
    }

    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> u64 {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn judgment_calls(&self) -> u64 {
        self.judgment_calls.load(Ordering::Relaxed)
    }

    pub fn judgment_fallbacks(&self) -> u64 {
        self.judgment_fallbacks.load(Ordering::Relaxed)
    }

    pub fn revisions(&self) -> u64 {
        self.revisions.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.scans_completed.store(0, Ordering::Relaxed);
        self.provider_failures.store(0, Ordering::Relaxed);
        self.judgment_calls.store(0, Ordering::Relaxed);
        self.judgment_fallbacks.store(0, Ordering::Relaxed);
        self.revisions.store(0, Ordering::Relaxed);
    }
}
