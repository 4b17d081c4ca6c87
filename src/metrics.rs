//! Request metrics for production monitoring.
//!
//! Tracks request counts, predictions served, and inference latency
//! with relaxed atomics; nothing here blocks the request path. Exposed
//! in Prometheus text format on `GET /metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector shared by all request handlers.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of requests processed
    total_requests: Arc<AtomicUsize>,
    /// Requests that produced a prediction batch
    successful_requests: Arc<AtomicUsize>,
    /// Requests rejected or failed
    failed_requests: Arc<AtomicUsize>,
    /// Total predictions returned across all requests
    total_predictions: Arc<AtomicUsize>,
    /// Total inference time in microseconds
    total_inference_time_us: Arc<AtomicU64>,
    /// Start time for rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_predictions: Arc::new(AtomicUsize::new(0)),
            total_inference_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction request.
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, predictions: usize, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_predictions
            .fetch_add(predictions, Ordering::Relaxed);
        self.total_inference_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed or rejected request.
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the counters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_predictions = self.total_predictions.load(Ordering::Relaxed);
        let total_time_us = self.total_inference_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            total_predictions,
            total_inference_time_us: total_time_us,
            uptime_secs: uptime.as_secs(),
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Export metrics in Prometheus text format.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP panen_requests_total Total number of requests\n\
             # TYPE panen_requests_total counter\n\
             panen_requests_total {}\n\
             # HELP panen_requests_successful Successful requests\n\
             # TYPE panen_requests_successful counter\n\
             panen_requests_successful {}\n\
             # HELP panen_requests_failed Failed requests\n\
             # TYPE panen_requests_failed counter\n\
             panen_requests_failed {}\n\
             # HELP panen_predictions_total Predictions returned\n\
             # TYPE panen_predictions_total counter\n\
             panen_predictions_total {}\n\
             # HELP panen_inference_time_seconds Total inference time\n\
             # TYPE panen_inference_time_seconds counter\n\
             panen_inference_time_seconds {:.6}\n\
             # HELP panen_avg_latency_ms Average latency in milliseconds\n\
             # TYPE panen_avg_latency_ms gauge\n\
             panen_avg_latency_ms {:.2}\n\
             # HELP panen_error_rate Error rate (0.0-1.0)\n\
             # TYPE panen_error_rate gauge\n\
             panen_error_rate {:.4}\n\
             # HELP panen_uptime_seconds Uptime in seconds\n\
             # TYPE panen_uptime_seconds counter\n\
             panen_uptime_seconds {}\n",
            snapshot.total_requests,
            snapshot.successful_requests,
            snapshot.failed_requests,
            snapshot.total_predictions,
            snapshot.total_inference_time_us as f64 / 1_000_000.0,
            snapshot.avg_latency_ms,
            snapshot.error_rate,
            snapshot.uptime_secs
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total number of requests processed
    pub total_requests: usize,
    /// Number of successful requests
    pub successful_requests: usize,
    /// Number of failed requests
    pub failed_requests: usize,
    /// Total predictions returned across all requests
    pub total_predictions: usize,
    /// Total inference time in microseconds
    pub total_inference_time_us: u64,
    /// System uptime in seconds
    pub uptime_secs: u64,
    /// Average request latency in milliseconds
    pub avg_latency_ms: f64,
    /// Error rate as a fraction (0.0 to 1.0)
    pub error_rate: f64,
}
