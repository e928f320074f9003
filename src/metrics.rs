//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};

/// Issuer metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub broadcasts_total: IntCounter,
    pub escalations_total: IntCounter,
    pub duplicates_absorbed: IntCounter,
    pub retries_total: IntCounter,
    pub batches_issued: IntCounter,
    pub batches_failed: IntCounter,

    // Histograms
    pub confirmation_wait: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let broadcasts_total = IntCounter::with_opts(Opts::new(
            "broadcasts_total",
            "Issue transactions broadcast to the ledger",
        ))?;

        let escalations_total = IntCounter::with_opts(Opts::new(
            "escalations_total",
            "Fee escalations performed",
        ))?;

        let duplicates_absorbed = IntCounter::with_opts(Opts::new(
            "duplicates_absorbed",
            "Duplicate-submission rejections absorbed as success",
        ))?;

        let retries_total = IntCounter::with_opts(Opts::new(
            "retries_total",
            "Orchestrator-level retryable failures",
        ))?;

        let batches_issued = IntCounter::with_opts(Opts::new(
            "batches_issued",
            "Batches whose commitment confirmed on the ledger",
        ))?;

        let batches_failed = IntCounter::with_opts(Opts::new(
            "batches_failed",
            "Batches abandoned after exhausting attempts",
        ))?;

        let confirmation_wait = Histogram::with_opts(HistogramOpts::new(
            "confirmation_wait_seconds",
            "Time spent waiting for transaction confirmations",
        ))?;

        registry.register(Box::new(broadcasts_total.clone()))?;
        registry.register(Box::new(escalations_total.clone()))?;
        registry.register(Box::new(duplicates_absorbed.clone()))?;
        registry.register(Box::new(retries_total.clone()))?;
        registry.register(Box::new(batches_issued.clone()))?;
        registry.register(Box::new(batches_failed.clone()))?;
        registry.register(Box::new(confirmation_wait.clone()))?;

        Ok(Self {
            registry,
            broadcasts_total,
            escalations_total,
            duplicates_absorbed,
            retries_total,
            batches_issued,
            batches_failed,
            confirmation_wait,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
