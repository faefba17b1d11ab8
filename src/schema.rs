use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------
// Price sample (Pipeline A)
// ------------------------------------------------------------
//
// The last price observed on the trade feed.
//
// Lifecycle:
// - Overwritten by the stream listener on every inbound tick
// - Read (not cleared) by the periodic flusher
// - Absent until the first tick arrives
//
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    /// Last traded price
    pub price: f64,

    /// When the tick was observed (listener wall clock)
    ///
    /// Kept for logging only; the sink record carries the flush
    /// time, not this value.
    pub observed_at: DateTime<Utc>,
}

// ------------------------------------------------------------
// Firehose record (Pipeline A)
// ------------------------------------------------------------
//
// The payload submitted to the delivery stream, one per sampling
// interval that had a price available.
//
// Immutable once constructed; dropped after submission whether or
// not the sink accepted it (fire-and-forget).
//
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FirehoseRecord {
    /// Sampled price
    pub price: f64,

    /// Flush timestamp, ISO-8601
    ///
    /// DESIGN DECISION:
    /// The timestamp is taken when the record is built, not when the
    /// tick arrived. Sampling cadence is decoupled from tick cadence;
    /// two flushes with no tick in between yield distinct timestamps.
    pub date: String,
}

// ------------------------------------------------------------
// Asset row (Pipeline B)
// ------------------------------------------------------------
//
// One parsed data row of the index composition table.
//
// Field names are serialized with the column names of the upstream
// dataset, so CSV and parquet output stay byte-compatible with the
// historical exports consumed downstream.
//
// INVARIANT:
// - Built only from source rows with exactly 5 cells; anything else
//   is dropped at extraction time.
//
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssetRow {
    /// Ticker code (e.g. "PETR4")
    #[serde(rename = "codigo")]
    pub code: String,

    /// Company name
    #[serde(rename = "acao")]
    pub name: String,

    /// Share type (e.g. "ON", "PN")
    #[serde(rename = "tipo")]
    pub asset_type: String,

    /// Theoretical quantity in the index portfolio
    #[serde(rename = "qtde_teorica")]
    pub theoretical_qty: u64,

    /// Participation percentage in the index
    #[serde(rename = "participacao_percentual")]
    pub participation_pct: f64,

    /// Capture date (run date, not a per-row business date)
    #[serde(rename = "ano")]
    pub year: i32,

    #[serde(rename = "mes")]
    pub month: u32,

    #[serde(rename = "dia")]
    pub day: u32,
}

// ------------------------------------------------------------
// Dataset (Pipeline B)
// ------------------------------------------------------------
//
// Ordered accumulation of rows across all scraped pages.
//
// Order is scrape order: pages in visit order, rows in table order
// within each page. Grows only while pagination runs; finalized when
// the controller reaches its terminal state.
//
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    rows: Vec<AssetRow>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one page of rows, preserving arrival order.
    pub fn push_page(&mut self, page: Vec<AssetRow>) {
        self.rows.extend(page);
    }

    pub fn rows(&self) -> &[AssetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str) -> AssetRow {
        AssetRow {
            code: code.to_string(),
            name: "Acme".to_string(),
            asset_type: "ON".to_string(),
            theoretical_qty: 100,
            participation_pct: 1.5,
            year: 2026,
            month: 8,
            day: 28,
        }
    }

    #[test]
    fn dataset_preserves_page_then_row_order() {
        let mut ds = Dataset::new();
        ds.push_page(vec![row("AAA"), row("BBB")]);
        ds.push_page(vec![row("CCC")]);
        let codes: Vec<_> = ds.rows().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn asset_row_serializes_with_upstream_column_names() {
        let v = serde_json::to_value(row("PETR4")).unwrap();
        assert_eq!(v["codigo"], "PETR4");
        assert_eq!(v["qtde_teorica"], 100);
        assert_eq!(v["participacao_percentual"], 1.5);
        assert_eq!(v["ano"], 2026);
    }
}
