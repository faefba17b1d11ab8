/// Sampler module (Pipeline A)
///
/// This module groups all logic responsible for:
/// - Holding the latest observed price (single-slot cell)
/// - Maintaining the trade feed subscription
/// - Flushing the latest price to the durable sink on a fixed cadence
///
/// Dataflow:
/// - listener  -> cell   (overwrite on every tick, no backpressure)
/// - flusher   -> cell   (non-destructive read, once per interval)
/// - flusher   -> sink   (one record per interval with data)
///
/// Design notes:
/// - The listener never blocks on the flusher and vice versa
/// - Sink failures are logged and dropped; nothing is retried here
pub mod cell;
pub mod listener;
pub mod flusher;
pub mod sink;
