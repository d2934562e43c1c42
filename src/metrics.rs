//! Guard metrics and observability.
//!
//! Counters tracking how often the recheck path skips translation, how often
//! it re-applies it, and how often collaborators fail.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-guard counters.
#[derive(Debug, Default)]
pub struct GuardMetrics {
    /// Deferred rechecks that ran to a decision (not superseded)
    rechecks: AtomicUsize,

    /// Rechecks that found the content unchanged and skipped the engine
    unchanged: AtomicUsize,

    /// Engine calls made from the recheck path
    retranslations: AtomicUsize,

    /// Deferred rechecks dropped because a newer call superseded them
    superseded: AtomicUsize,

    /// Engine calls (from either path) that returned an error
    engine_failures: AtomicUsize,

    /// Store reads or writes that failed
    store_failures: AtomicUsize,
}

impl GuardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_recheck(&self) {
        self.rechecks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retranslation(&self) {
        self.retranslations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_engine_failure(&self) {
        self.engine_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rechecks(&self) -> usize {
        self.rechecks.load(Ordering::Relaxed)
    }

    pub fn unchanged(&self) -> usize {
        self.unchanged.load(Ordering::Relaxed)
    }

    pub fn retranslations(&self) -> usize {
        self.retranslations.load(Ordering::Relaxed)
    }

    pub fn superseded(&self) -> usize {
        self.superseded.load(Ordering::Relaxed)
    }

    pub fn engine_failures(&self) -> usize {
        self.engine_failures.load(Ordering::Relaxed)
    }

    pub fn store_failures(&self) -> usize {
        self.store_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let rechecks = self.rechecks();
        let unchanged = self.unchanged();
        let skip_rate = if rechecks > 0 {
            (unchanged as f64 / rechecks as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            rechecks,
            unchanged,
            retranslations: self.retranslations(),
            superseded: self.superseded(),
            engine_failures: self.engine_failures(),
            store_failures: self.store_failures(),
            skip_rate,
        }
    }
}

/// Snapshot of guard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub rechecks: usize,
    pub unchanged: usize,
    pub retranslations: usize,
    pub superseded: usize,
    pub engine_failures: usize,
    pub store_failures: usize,

    /// Share of rechecks that skipped the engine, as a percentage (0-100)
    pub skip_rate: f64,
}
