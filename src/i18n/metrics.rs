//! Translation engine metrics.
//!
//! Counters for cache effectiveness around translation lists, calls into the
//! translation store, and successful mutations.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global translation metrics singleton.
pub struct TranslationMetrics {
    /// Translation lists served from the cache
    cache_hits: AtomicUsize,

    /// Translation lists that had to be loaded from the store
    cache_misses: AtomicUsize,

    /// Calls made into the translation store
    store_calls: AtomicUsize,

    /// Store calls that returned an error
    store_failures: AtomicUsize,

    /// Successful create, update and delete operations
    mutations: AtomicUsize,
}

static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl Default for TranslationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationMetrics {
    /// Get the global translation metrics instance.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(TranslationMetrics::new)
    }

    /// A standalone set of counters, all zero.
    pub fn new() -> Self {
        Self {
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
            store_failures: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_call(&self) {
        self.store_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::Relaxed)
    }

    pub fn store_failures(&self) -> usize {
        self.store_failures.load(Ordering::Relaxed)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let cache_hit_rate = percentage(hits, hits + misses);

        let calls = self.store_calls();
        let failures = self.store_failures().min(calls);
        let store_success_rate = percentage(calls - failures, calls);

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            store_calls: calls,
            store_failures: failures,
            store_success_rate,
            mutations: self.mutations(),
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Snapshot of the translation metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub store_calls: usize,
    pub store_failures: usize,

    /// Store success rate as a percentage (0-100)
    pub store_success_rate: f64,

    pub mutations: usize,
}
