use std::sync::Mutex;

use chrono::Utc;

use crate::schema::PriceSample;

/// Single-slot shared cell holding the latest observed price.
///
/// Exactly two parties touch it:
/// - The stream listener overwrites it on every inbound tick
///   (last-write-wins, no queueing)
/// - The periodic flusher peeks it without clearing
///
/// The slot starts empty and stays non-empty after the first tick;
/// a flush never consumes the value, so two consecutive flushes with
/// no tick in between observe the same price.
///
/// THREAD SAFETY:
/// - A std mutex guards the option; the critical section is a single
///   copy with no await points, so contention is negligible.
#[derive(Debug, Default)]
pub struct PriceCell {
    slot: Mutex<Option<PriceSample>>,
}

impl PriceCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a new price, overwriting any prior value.
    pub fn store(&self, price: f64) {
        let sample = PriceSample {
            price,
            observed_at: Utc::now(),
        };
        *self.slot.lock().expect("price cell poisoned") = Some(sample);
    }

    /// Non-destructive read of the latest sample, if any tick has
    /// arrived yet.
    pub fn peek(&self) -> Option<PriceSample> {
        *self.slot.lock().expect("price cell poisoned")
    }
}
