//! Metrics collection
//!
//! Atomic counters, gauges and histograms with a Prometheus text export,
//! plus [`PipelineMetrics`], the named series the pipeline records.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Monotonic counter
#[derive(Debug, Default, Clone)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by `n`
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Value that goes up and down
#[derive(Debug, Default, Clone)]
pub struct Gauge {
    value: Arc<AtomicI64>,
}

impl Gauge {
    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement by 1
    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Cumulative-bucket histogram
#[derive(Debug, Clone)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    counts: Arc<[AtomicU64]>,
    sum_micros: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

/// Latency buckets in milliseconds
const LATENCY_BUCKETS_MS: &[f64] = &[
    10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
];

impl Histogram {
    /// Histogram with the given upper bounds
    #[must_use]
    pub fn with_buckets(bounds: &[f64]) -> Self {
        Self {
            bounds: bounds.into(),
            counts: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            sum_micros: Arc::new(AtomicU64::new(0)),
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an observation
    pub fn observe(&self, value: f64) {
        self.sum_micros
            .fetch_add((value.max(0.0) * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        for (bound, count) in self.bounds.iter().zip(self.counts.iter()) {
            if value <= *bound {
                count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of observations
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1000.0
    }

    /// `(upper bound, cumulative count)` pairs
    #[must_use]
    pub fn buckets(&self) -> Vec<(f64, u64)> {
        self.bounds
            .iter()
            .zip(self.counts.iter())
            .map(|(bound, count)| (*bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::with_buckets(LATENCY_BUCKETS_MS)
    }
}

fn series_key(name: &str, labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let rendered: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect();
    format!("{name}{{{}}}", rendered.join(","))
}

fn base_name(series: &str) -> &str {
    series.split('{').next().unwrap_or(series)
}

/// Get-or-create registry keyed by series (name plus labels)
#[derive(Debug, Default, Clone)]
pub struct MetricsRegistry {
    counters: Arc<RwLock<BTreeMap<String, Counter>>>,
    gauges: Arc<RwLock<BTreeMap<String, Gauge>>>,
    histograms: Arc<RwLock<BTreeMap<String, Histogram>>>,
}

impl MetricsRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter for `name`
    pub fn counter(&self, name: &str) -> Counter {
        self.counter_with(name, &[])
    }

    /// Counter for `name` with labels
    pub fn counter_with(&self, name: &str, labels: &[(&str, &str)]) -> Counter {
        let key = series_key(name, labels);
        if let Some(counter) = self
            .counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return counter.clone();
        }
        self.counters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key)
            .or_default()
            .clone()
    }

    /// Gauge for `name`
    pub fn gauge(&self, name: &str) -> Gauge {
        if let Some(gauge) = self
            .gauges
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return gauge.clone();
        }
        self.gauges
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Latency histogram for `name`
    pub fn histogram(&self, name: &str) -> Histogram {
        if let Some(histogram) = self
            .histograms
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return histogram.clone();
        }
        self.histograms
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Prometheus text exposition
    #[must_use]
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        let mut last_type_line = String::new();
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        for (series, counter) in counters.iter() {
            let name = base_name(series);
            if name != last_type_line {
                output.push_str(&format!("# TYPE {name} counter\n"));
                last_type_line = name.to_string();
            }
            output.push_str(&format!("{series} {}\n", counter.get()));
        }

        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        for (name, gauge) in gauges.iter() {
            output.push_str(&format!("# TYPE {name} gauge\n{name} {}\n", gauge.get()));
        }

        let histograms = self.histograms.read().unwrap_or_else(|e| e.into_inner());
        for (name, histogram) in histograms.iter() {
            output.push_str(&format!("# TYPE {name} histogram\n"));
            for (bound, count) in histogram.buckets() {
                output.push_str(&format!("{name}_bucket{{le=\"{bound}\"}} {count}\n"));
            }
            output.push_str(&format!(
                "{name}_bucket{{le=\"+Inf\"}} {}\n",
                histogram.count()
            ));
            output.push_str(&format!("{name}_sum {}\n", histogram.sum()));
            output.push_str(&format!("{name}_count {}\n", histogram.count()));
        }

        output
    }
}

// ============================================================================
// Pipeline series
// ============================================================================

/// Named series recorded by the request pipeline
#[derive(Debug, Default, Clone)]
pub struct PipelineMetrics {
    registry: MetricsRegistry,
}

impl PipelineMetrics {
    /// Record into `registry`
    #[must_use]
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry }
    }

    /// Underlying registry
    #[must_use]
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }

    /// A request entered the pipeline
    pub fn request_started(&self) {
        self.registry.gauge("cortex_active_requests").inc();
    }

    /// A request left the pipeline
    pub fn request_finished(&self, category: &str, latency_ms: u64, total_tokens: u32, failed: bool) {
        self.registry.gauge("cortex_active_requests").dec();
        self.registry
            .counter_with("cortex_requests_total", &[("category", category)])
            .inc();
        if failed {
            self.registry.counter("cortex_request_failures_total").inc();
        }
        self.registry
            .histogram("cortex_request_duration_ms")
            .observe(latency_ms as f64);
        self.registry
            .counter("cortex_tokens_total")
            .inc_by(u64::from(total_tokens));
    }

    /// PII values were redacted
    pub fn pii_redacted(&self, count: usize) {
        self.registry
            .counter("cortex_pii_redactions_total")
            .inc_by(count as u64);
    }

    /// The sentiment breaker forced escalation
    pub fn sentiment_override(&self) {
        self.registry.counter("cortex_sentiment_overrides_total").inc();
    }

    /// Memory context was retrieved
    pub fn memory_retrieved(&self) {
        self.registry.counter("cortex_memory_retrievals_total").inc();
    }

    /// A memory write-back was scheduled
    pub fn memory_stored(&self) {
        self.registry.counter("cortex_memory_stores_total").inc();
    }

    /// The fallback path was used
    pub fn fallback_used(&self) {
        self.registry.counter("cortex_fallbacks_total").inc();
    }

    /// The vision waterfall downgraded
    pub fn vision_downgrade(&self) {
        self.registry.counter("cortex_vision_downgrades_total").inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_buckets_are_cumulative() {
        let histogram = Histogram::with_buckets(&[10.0, 50.0, 100.0]);
        for value in [5.0, 25.0, 75.0, 150.0] {
            histogram.observe(value);
        }
        assert_eq!(histogram.count(), 4);
        assert_eq!(histogram.buckets(), vec![(10.0, 1), (50.0, 2), (100.0, 3)]);
        assert!((histogram.sum() - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_registry_returns_shared_series() {
        let registry = MetricsRegistry::new();
        registry.counter("hits").inc();
        registry.counter("hits").inc();
        assert_eq!(registry.counter("hits").get(), 2);

        registry.counter_with("hits_by", &[("kind", "a")]).inc();
        assert_eq!(registry.counter_with("hits_by", &[("kind", "b")]).get(), 0);
    }

    #[test]
    fn test_pipeline_metrics_export() {
        let metrics = PipelineMetrics::default();
        metrics.request_started();
        metrics.pii_redacted(2);
        metrics.request_finished("code_generation", 120, 15, false);
        metrics.request_finished("simple_chat", 20, 15, true);

        let text = metrics.registry().export_prometheus();
        assert!(text.contains("cortex_requests_total{category=\"code_generation\"} 1"));
        assert!(text.contains("cortex_pii_redactions_total 2"));
        assert!(text.contains("cortex_tokens_total 30"));
        assert!(text.contains("cortex_request_failures_total 1"));
        assert!(text.contains("cortex_active_requests -1"));
        assert_eq!(text.matches("# TYPE cortex_requests_total counter").count(), 1);
        assert!(text.contains("cortex_request_duration_ms_count 2"));
    }
}
