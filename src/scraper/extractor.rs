use std::sync::atomic::Ordering;

use anyhow::Result;
use log::{debug, warn};
use tokio::time::{Duration, Instant, sleep};

use crate::config::ScraperConfig;
use crate::metrics::METRICS;
use crate::schema::AssetRow;
use crate::scraper::driver::PageDriver;
use crate::util::{clean_number, today_ymd};

/// Parses the data table of the currently rendered page into typed
/// rows.
///
/// Behavior:
/// - Waits up to the table budget for the table to appear; on
///   timeout returns an empty sequence (logged, not an error)
/// - Skips row 0 (header)
/// - Keeps only rows with exactly 5 cells; everything else is
///   silently dropped
/// - Stamps every row with the capture date of this extraction
pub struct PageExtractor {
    table_wait: Duration,
    poll: Duration,
}

impl PageExtractor {
    pub fn new(cfg: &ScraperConfig) -> Self {
        Self {
            table_wait: Duration::from_secs(cfg.table_wait_secs),
            poll: Duration::from_millis(cfg.poll_interval_ms),
        }
    }

    /// Extracts the rows of the visible page, empty when the table
    /// never showed up within the budget.
    pub async fn extract(&self, driver: &mut dyn PageDriver) -> Result<Vec<AssetRow>> {
        let deadline = Instant::now() + self.table_wait;

        let raw = loop {
            if let Some(rows) = driver.table_rows().await? {
                break rows;
            }
            if Instant::now() >= deadline {
                warn!("table not found on current page");
                return Ok(Vec::new());
            }
            sleep(self.poll).await;
        };

        let rows = parse_rows(raw);
        debug!("extracted {} rows", rows.len());
        Ok(rows)
    }
}

/// Turns raw cell text into [`AssetRow`]s, applying the 5-cell
/// invariant and the locale cleaning rules.
///
/// The quantity cell is cleaned as a float first (it carries
/// thousands separators) and then truncated; negative garbage
/// saturates to zero.
pub fn parse_rows(raw: Vec<Vec<String>>) -> Vec<AssetRow> {
    let (year, month, day) = today_ymd();
    let mut rows = Vec::new();

    for cells in raw.into_iter().skip(1) {
        if cells.len() != 5 {
            METRICS.rows_dropped.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        rows.push(AssetRow {
            code: cells[0].trim().to_string(),
            name: cells[1].trim().to_string(),
            asset_type: cells[2].trim().to_string(),
            theoretical_qty: clean_number(&cells[3]) as u64,
            participation_pct: clean_number(&cells[4]),
            year,
            month,
            day,
        });
    }

    METRICS.rows_extracted.fetch_add(rows.len(), Ordering::Relaxed);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::driver::NextControl;
    use async_trait::async_trait;

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_row_is_skipped_and_five_cell_rows_kept() {
        let raw = vec![
            cells(&[]), // header <tr> has no <td> cells
            cells(&["PETR4", "PETROBRAS", "PN", "4.602.905.437", "6,837"]),
        ];

        let rows = parse_rows(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "PETR4");
        assert_eq!(rows[0].theoretical_qty, 4_602_905_437);
        assert_eq!(rows[0].participation_pct, 6.837);
    }

    #[test]
    fn rows_with_wrong_cell_count_are_dropped() {
        let raw = vec![
            cells(&[]),
            cells(&["A", "B", "C", "1"]),                 // 4 cells
            cells(&["A", "B", "C", "1", "2,0", "extra"]), // 6 cells
            cells(&["VALE3", "VALE", "ON", "100", "1,0"]),
        ];

        let rows = parse_rows(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "VALE3");
    }

    #[test]
    fn all_rows_of_one_extraction_share_the_capture_date() {
        let raw = vec![
            cells(&[]),
            cells(&["A1", "N1", "ON", "1", "1,0"]),
            cells(&["A2", "N2", "ON", "2", "2,0"]),
        ];

        let rows = parse_rows(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            (rows[0].year, rows[0].month, rows[0].day),
            (rows[1].year, rows[1].month, rows[1].day)
        );
    }

    #[test]
    fn unparseable_numeric_cells_resolve_to_zero() {
        let raw = vec![cells(&[]), cells(&["X", "Y", "ON", "n/d", ""])];

        let rows = parse_rows(raw);
        assert_eq!(rows[0].theoretical_qty, 0);
        assert_eq!(rows[0].participation_pct, 0.0);
    }

    /// Driver whose table never appears.
    struct EmptyDriver;

    #[async_trait]
    impl PageDriver for EmptyDriver {
        async fn table_rows(&mut self) -> Result<Option<Vec<Vec<String>>>> {
            Ok(None)
        }
        async fn marker_text(&mut self) -> Result<Option<String>> {
            Ok(None)
        }
        async fn next_control(&mut self) -> Result<NextControl> {
            Ok(NextControl::Missing)
        }
        async fn click_next(&mut self) -> Result<()> {
            Ok(())
        }
        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_table_yields_empty_sequence_after_wait() {
        let extractor = PageExtractor::new(&crate::config::ScraperConfig::default());
        let mut driver = EmptyDriver;

        let rows = extractor.extract(&mut driver).await.unwrap();
        assert!(rows.is_empty());
    }
}
