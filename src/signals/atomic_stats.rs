/*!
 * Lock-Free Router Statistics
 * Atomic counters updated on the router hot paths
 */

use super::types::SignalStats;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Atomic router statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Relaxed increments, acquire loads in snapshots
#[repr(C, align(64))]
pub struct AtomicSignalStats {
    definitions_registered: AtomicU64,
    total_enqueued: AtomicU64,
    total_rejected: AtomicU64,
    total_handled: AtomicU64,
    total_failed: AtomicU64,
    total_cleared: AtomicU64,
    total_finalized: AtomicU64,
    live_signals: AtomicUsize,
}

impl AtomicSignalStats {
    #[inline]
    pub fn new() -> Self {
        Self {
            definitions_registered: AtomicU64::new(0),
            total_enqueued: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
            total_handled: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
            total_cleared: AtomicU64::new(0),
            total_finalized: AtomicU64::new(0),
            live_signals: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    pub fn inc_definitions(&self) {
        self.definitions_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called on every accepted enqueue
    #[inline(always)]
    pub fn inc_enqueued(&self) {
        self.total_enqueued.fetch_add(1, Ordering::Relaxed);
        self.live_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// Hot path - called when a full queue turns a producer away
    #[inline(always)]
    pub fn inc_rejected(&self) {
        self.total_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_handled(&self) {
        self.total_handled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_failed(&self) {
        self.total_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn add_cleared(&self, count: usize) {
        self.total_cleared.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_finalized(&self) {
        self.total_finalized.fetch_add(1, Ordering::Relaxed);
        self.live_signals.fetch_sub(1, Ordering::Relaxed);
    }

    /// Snapshot of current counters (no locks required)
    ///
    /// # Note
    /// Values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate. This is acceptable for monitoring.
    #[inline]
    pub fn snapshot(&self) -> SignalStats {
        SignalStats {
            definitions_registered: self.definitions_registered.load(Ordering::Acquire),
            total_enqueued: self.total_enqueued.load(Ordering::Acquire),
            total_rejected: self.total_rejected.load(Ordering::Acquire),
            total_handled: self.total_handled.load(Ordering::Acquire),
            total_failed: self.total_failed.load(Ordering::Acquire),
            total_cleared: self.total_cleared.load(Ordering::Acquire),
            total_finalized: self.total_finalized.load(Ordering::Acquire),
            live_signals: self.live_signals.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicSignalStats {
    fn default() -> Self {
        Self::new()
    }
}
