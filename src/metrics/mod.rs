//! Metrics collection module
//!
//! Tracks provider call counts, error rates, latency and dropped pages.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Number of response times kept per provider
const RESPONSE_TIME_WINDOW: usize = 100;

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`
pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Metrics collector shared by the orchestrator
pub struct Metrics {
    /// Total deep search count
    pub total_deep_searches: AtomicU64,
    /// Pages dropped because their fetch failed
    pub dropped_pages: AtomicU64,
    /// Calls per provider
    provider_calls: RwLock<HashMap<String, u64>>,
    /// Provider response times (rolling window in ms)
    provider_response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Provider error counts
    provider_errors: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_deep_searches: AtomicU64::new(0),
            dropped_pages: AtomicU64::new(0),
            provider_calls: RwLock::new(HashMap::new()),
            provider_response_times: RwLock::new(HashMap::new()),
            provider_errors: RwLock::new(HashMap::new()),
        }
    }

    pub fn inc_deep_search(&self) {
        self.total_deep_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_dropped_pages(&self, count: u64) {
        self.dropped_pages.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a finished provider call
    pub fn record_call(&self, provider: &str, time_ms: u64, success: bool) {
        {
            let mut calls = self
                .provider_calls
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *calls.entry(provider.to_string()).or_insert(0) += 1;
        }

        {
            let mut times = self
                .provider_response_times
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let entry = times.entry(provider.to_string()).or_default();
            if entry.len() >= RESPONSE_TIME_WINDOW {
                entry.remove(0);
            }
            entry.push(time_ms);
        }

        if !success {
            let mut errors = self
                .provider_errors
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *errors.entry(provider.to_string()).or_insert(0) += 1;
        }
    }

    /// Average response time over the rolling window
    pub fn avg_response_time(&self, provider: &str) -> Option<f64> {
        let times = self
            .provider_response_times
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        times.get(provider).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() as f64 / t.len() as f64)
            }
        })
    }

    /// Fraction of calls that failed
    pub fn error_rate(&self, provider: &str) -> f64 {
        let calls = self
            .provider_calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .copied()
            .unwrap_or(0);
        if calls == 0 {
            return 0.0;
        }
        let errors = self
            .provider_errors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .copied()
            .unwrap_or(0);
        errors as f64 / calls as f64
    }

    /// Point-in-time view of all counters, providers sorted by name
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut names: Vec<String> = self
            .provider_calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();

        let providers = names
            .into_iter()
            .map(|name| {
                let calls = self
                    .provider_calls
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&name)
                    .copied()
                    .unwrap_or(0);
                ProviderStats {
                    avg_response_time_ms: self.avg_response_time(&name),
                    error_rate: self.error_rate(&name),
                    calls,
                    name,
                }
            })
            .collect();

        MetricsSnapshot {
            total_deep_searches: self.total_deep_searches.load(Ordering::Relaxed),
            dropped_pages: self.dropped_pages.load(Ordering::Relaxed),
            providers,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics view
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_deep_searches: u64,
    pub dropped_pages: u64,
    pub providers: Vec<ProviderStats>,
}

/// Statistics for a single provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStats {
    pub name: String,
    pub calls: u64,
    pub avg_response_time_ms: Option<f64>,
    pub error_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_calls() {
        let metrics = Metrics::new();
        metrics.record_call("searxng", 100, true);
        metrics.record_call("searxng", 300, false);

        assert_eq!(metrics.avg_response_time("searxng"), Some(200.0));
        assert_eq!(metrics.error_rate("searxng"), 0.5);
        assert_eq!(metrics.error_rate("unknown"), 0.0);
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_response_time_window() {
        let metrics = Metrics::new();
        for _ in 0..RESPONSE_TIME_WINDOW {
            metrics.record_call("a", 10, true);
        }
        metrics.record_call("a", 10 + RESPONSE_TIME_WINDOW as u64 * 10, true);

        // One 10ms sample was evicted for the slow one
        assert_eq!(metrics.avg_response_time("a"), Some(20.0));
    }

    #[test]
    fn test_snapshot_sorted() {
        let metrics = Metrics::new();
        metrics.record_call("b", 5, true);
        metrics.record_call("a", 5, true);
        metrics.inc_deep_search();
        metrics.add_dropped_pages(2);

        let snapshot = metrics.snapshot();
        let names: Vec<_> = snapshot.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(snapshot.total_deep_searches, 1);
        assert_eq!(snapshot.dropped_pages, 2);
    }
}
