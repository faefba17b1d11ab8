use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;
use log::info;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    metrics::METRICS,
    sampler::{cell::PriceCell, sink::SinkWriter},
    schema::FirehoseRecord,
};

/// Flushes the latest observed price to the sink on a fixed cadence.
///
/// This loop:
/// - Ticks at a fixed rate, independent of tick arrival rate
/// - Peeks the shared cell without clearing it
/// - Submits exactly one record per interval that had data
/// - Logs a no-op for intervals with no price yet
///
/// The first flush happens one full interval after startup; the cell
/// is almost certainly still empty before that anyway.
///
/// CADENCE:
/// - A fixed-rate interval, so flush times do not drift with the
///   duration of each submission.
pub struct PeriodicSampler {
    cell: Arc<PriceCell>,
    writer: SinkWriter,
    interval: Duration,
    shutdown: CancellationToken,
}

impl PeriodicSampler {
    pub fn new(
        cell: Arc<PriceCell>,
        writer: SinkWriter,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cell,
            writer,
            interval,
            shutdown,
        }
    }

    /// Runs the flush loop until shutdown.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);

        // The interval's immediate first tick is skipped; sampling
        // starts one full period after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("periodic sampler stopping");
                    return;
                }
                _ = ticker.tick() => self.flush_once().await,
            }
        }
    }

    /// One sampling interval: peek the cell and submit if present.
    ///
    /// The record carries the flush-time timestamp, not the tick's
    /// observation time. Two intervals with no tick in between thus
    /// produce two records with the same price and distinct dates.
    pub async fn flush_once(&self) {
        match self.cell.peek() {
            None => {
                METRICS.empty_intervals.fetch_add(1, Ordering::Relaxed);
                info!("no price update to send");
            }
            Some(sample) => {
                let record = FirehoseRecord {
                    price: sample.price,
                    date: Utc::now().to_rfc3339(),
                };
                self.writer.submit(&record).await;
            }
        }
    }
}
