use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures_util::StreamExt;
use log::{error, info, warn};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::{config::SamplerConfig, metrics::METRICS, sampler::cell::PriceCell};

/// Maintains the long-lived trade feed subscription.
///
/// This loop:
/// - Connects to the feed WebSocket endpoint
/// - Publishes every parsed tick price into the shared cell
/// - Reconnects after a delay on transport error or remote close
/// - Exits only when the shutdown token fires
///
/// GUARANTEES:
/// - Never blocks the flusher; publishing is a single slot overwrite
/// - A malformed tick is logged and skipped, never fatal
///
/// The feed URL already names the venue topic, so no subscription
/// message is sent after connecting.
pub struct StreamListener {
    cfg: SamplerConfig,
    cell: Arc<PriceCell>,
    shutdown: CancellationToken,
}

impl StreamListener {
    pub fn new(cfg: SamplerConfig, cell: Arc<PriceCell>, shutdown: CancellationToken) -> Self {
        Self {
            cfg,
            cell,
            shutdown,
        }
    }

    /// Runs the connect/read/reconnect loop until shutdown.
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("feed listener stopping");
                    return;
                }

                conn = connect_async(self.cfg.feed_url.as_str()) => match conn {
                    Ok((ws, _)) => {
                        info!("feed connected, awaiting live price data");
                        self.read_loop(ws).await;
                    }
                    Err(e) => {
                        error!("feed connect failed: {e}");
                    }
                }
            }

            // Reconnect delay; remote close and transport errors land here.
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("feed listener stopping");
                    return;
                }
                _ = sleep(Duration::from_secs(self.cfg.reconnect_delay_secs)) => {}
            }

            METRICS.ws_reconnects.fetch_add(1, Ordering::Relaxed);
            info!("re-dialing feed");
        }
    }

    /// Consumes frames from one connection until it ends.
    async fn read_loop(&self, ws: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        let (_, mut read) = ws.split();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,

                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_tick(&text),

                    // Ignore non-text frames (ping/pong/binary)
                    Some(Ok(_)) => {}

                    Some(Err(e)) => {
                        warn!("feed transport error: {e}");
                        return;
                    }

                    None => {
                        warn!("feed connection closed by remote");
                        return;
                    }
                }
            }
        }
    }

    /// Updates the shared cell from one raw tick frame.
    fn handle_tick(&self, raw: &str) {
        match parse_tick_price(raw) {
            Some(price) => {
                METRICS.ticks_received.fetch_add(1, Ordering::Relaxed);
                self.cell.store(price);
            }
            None => {
                METRICS.tick_parse_errors.fetch_add(1, Ordering::Relaxed);
                warn!("skipping tick without usable price field");
            }
        }
    }
}

/// Extracts the price from a raw tick frame.
///
/// The feed encodes the price as a decimal string under `p`. Anything
/// else (control frames, malformed JSON, missing field) yields None.
fn parse_tick_price(raw: &str) -> Option<f64> {
    let v: Value = serde_json::from_str(raw).ok()?;
    v.get("p")?.as_str()?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_encoded_price() {
        let raw = r#"{"e":"trade","s":"BTCUSDT","p":"64250.10","q":"0.002"}"#;
        assert_eq!(parse_tick_price(raw), Some(64250.10));
    }

    #[test]
    fn rejects_missing_or_non_decimal_price() {
        assert_eq!(parse_tick_price(r#"{"e":"trade"}"#), None);
        assert_eq!(parse_tick_price(r#"{"p":"abc"}"#), None);
        assert_eq!(parse_tick_price("not json"), None);
    }

    #[test]
    fn malformed_tick_leaves_cell_untouched() {
        let cell = Arc::new(PriceCell::new());
        let listener = StreamListener::new(
            SamplerConfig::default(),
            cell.clone(),
            CancellationToken::new(),
        );

        listener.handle_tick(r#"{"p":"100.5"}"#);
        listener.handle_tick("garbage");

        assert_eq!(cell.peek().unwrap().price, 100.5);
    }
}
