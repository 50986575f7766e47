//! Logging and metrics wrappers around a [`MessageRepository`]

use crate::{core::Record, error::Result, forwarder::MessageRepository};
use log::{info, warn};
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Logs the outcome and duration of every `save`.
pub struct LoggingMiddleware<R> {
    inner: R,
}

impl<R: MessageRepository> LoggingMiddleware<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: MessageRepository> MessageRepository for LoggingMiddleware<R> {
    async fn save(&self, records: &[Record]) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.save(records).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => info!(
                "Method save for {} records took {:?} to complete without errors.",
                records.len(),
                elapsed
            ),
            Err(e) => warn!(
                "Method save for {} records took {:?} to complete with error: {}.",
                records.len(),
                elapsed,
                e
            ),
        }
        result
    }
}

/// Counters shared between [`MetricsMiddleware`] and the health listener.
#[derive(Debug, Default)]
pub struct RepositoryMetrics {
    pub requests: AtomicU64,
    pub failures: AtomicU64,
    pub records: AtomicU64,
    pub latency_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub request_count: u64,
    pub failure_count: u64,
    pub record_count: u64,
    pub latency_microseconds_total: u64,
    pub latency_microseconds_avg: f64,
}

impl RepositoryMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        let request_count = self.requests.load(Ordering::Relaxed);
        let latency = self.latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            request_count,
            failure_count: self.failures.load(Ordering::Relaxed),
            record_count: self.records.load(Ordering::Relaxed),
            latency_microseconds_total: latency,
            latency_microseconds_avg: if request_count > 0 {
                latency as f64 / request_count as f64
            } else {
                0.0
            },
        }
    }
}

/// Counts `save` calls, failures, records and cumulative latency.
pub struct MetricsMiddleware<R> {
    inner: R,
    metrics: Arc<RepositoryMetrics>,
}

impl<R: MessageRepository> MetricsMiddleware<R> {
    pub fn new(inner: R, metrics: Arc<RepositoryMetrics>) -> Self {
        Self { inner, metrics }
    }

    pub fn metrics(&self) -> Arc<RepositoryMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl<R: MessageRepository> MessageRepository for MetricsMiddleware<R> {
    async fn save(&self, records: &[Record]) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.save(records).await;
        let micros = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

        self.metrics.requests.fetch_add(1, Ordering::Relaxed);
        self.metrics.latency_micros.fetch_add(micros, Ordering::Relaxed);
        self.metrics.records.fetch_add(records.len() as u64, Ordering::Relaxed);
        if result.is_err() {
            self.metrics.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}
