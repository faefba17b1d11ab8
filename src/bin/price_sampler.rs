// ------------------------------------------------------------
// Live price sampler entry point (Pipeline A)
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize cryptography backend (rustls)
// - Load configuration
// - Wire the shared price cell between listener and flusher
// - Start the metrics reporter
// - Shut both loops down on ctrl-c
//
use std::sync::Arc;
use std::sync::atomic::Ordering;

use log::info;
use rustls::crypto::{CryptoProvider, ring};
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

use b3_market_collectors::config::Config;
use b3_market_collectors::metrics::METRICS;
use b3_market_collectors::sampler::{
    cell::PriceCell,
    flusher::PeriodicSampler,
    listener::StreamListener,
    sink::{FirehoseSink, SinkWriter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // rustls >= 0.23 requires an explicit CryptoProvider installation,
    // exactly once and as early as possible in the process lifecycle.
    CryptoProvider::install_default(ring::default_provider())
        .expect("failed to install rustls CryptoProvider");

    let cfg = Config::load("config.json")?.sampler;
    info!(
        "starting price sampler: feed={} stream={} flush every {}s",
        cfg.feed_url, cfg.stream_name, cfg.flush_interval_secs
    );

    let cell = Arc::new(PriceCell::new());
    let shutdown = CancellationToken::new();

    let sink = FirehoseSink::connect(&cfg).await;
    let writer = SinkWriter::new(Arc::new(sink));

    let listener = StreamListener::new(cfg.clone(), cell.clone(), shutdown.clone());
    let flusher = PeriodicSampler::new(
        cell,
        writer,
        Duration::from_secs(cfg.flush_interval_secs),
        shutdown.clone(),
    );

    let listener_task = tokio::spawn(listener.run());
    let flusher_task = tokio::spawn(flusher.run());

    // --------------------------------------------------------
    // Metrics reporter (periodic, low-noise)
    // --------------------------------------------------------
    tokio::spawn(async {
        loop {
            sleep(Duration::from_secs(10)).await;

            info!(
                "[METRICS] ticks={} parse_err={} reconnects={} sent={} send_err={} empty={}",
                METRICS.ticks_received.load(Ordering::Relaxed),
                METRICS.tick_parse_errors.load(Ordering::Relaxed),
                METRICS.ws_reconnects.load(Ordering::Relaxed),
                METRICS.records_submitted.load(Ordering::Relaxed),
                METRICS.submit_errors.load(Ordering::Relaxed),
                METRICS.empty_intervals.load(Ordering::Relaxed),
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown.cancel();

    let _ = listener_task.await;
    let _ = flusher_task.await;

    Ok(())
}
