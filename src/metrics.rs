use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use once_cell::sync::Lazy;

/// Global runtime metrics for both collectors.
///
/// Purpose:
/// - Track feed throughput and parse failures (Pipeline A)
/// - Track sink submissions and drops (Pipeline A)
/// - Track scraped pages and row filtering (Pipeline B)
///
/// Design:
/// - Lock-free (Atomics)
/// - Cheap to update
/// - Safe in async + multithreaded contexts
#[derive(Default)]
pub struct RuntimeMetrics {
    // Feed level
    pub ticks_received: AtomicUsize,
    pub tick_parse_errors: AtomicUsize,
    pub ws_reconnects: AtomicUsize,

    // Sink level
    pub records_submitted: AtomicUsize,
    pub submit_errors: AtomicUsize,
    pub empty_intervals: AtomicUsize,

    // Scraper level
    pub pages_scraped: AtomicUsize,
    pub rows_extracted: AtomicUsize,
    pub rows_dropped: AtomicUsize,
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));
