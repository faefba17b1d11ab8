//! End-to-end pagination scenario against a scripted page driver:
//! three pages of 5/5/3 valid rows, last page's "next" control
//! disabled, followed by both exports.

use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use b3_market_collectors::config::ScraperConfig;
use b3_market_collectors::scraper::driver::{NextControl, PageDriver};
use b3_market_collectors::scraper::export;
use b3_market_collectors::scraper::pagination::PaginationController;

struct Page {
    rows: Vec<Vec<String>>,
    next: NextControl,
}

#[derive(Default)]
struct Shared {
    current: usize,
    closed: bool,
}

struct SiteDriver {
    pages: Vec<Page>,
    shared: Arc<Mutex<Shared>>,
}

#[async_trait]
impl PageDriver for SiteDriver {
    async fn table_rows(&mut self) -> Result<Option<Vec<Vec<String>>>> {
        let current = self.shared.lock().unwrap().current;
        Ok(Some(self.pages[current].rows.clone()))
    }

    async fn marker_text(&mut self) -> Result<Option<String>> {
        let current = self.shared.lock().unwrap().current;
        Ok(self.pages[current]
            .rows
            .get(1)
            .and_then(|r| r.first())
            .cloned())
    }

    async fn next_control(&mut self) -> Result<NextControl> {
        let current = self.shared.lock().unwrap().current;
        Ok(self.pages[current].next)
    }

    async fn click_next(&mut self) -> Result<()> {
        self.shared.lock().unwrap().current += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.shared.lock().unwrap().closed = true;
        Ok(())
    }
}

fn data_row(code: &str, pct: &str) -> Vec<String> {
    vec![
        code.to_string(),
        format!("{code} SA"),
        "ON".to_string(),
        "1.000.000".to_string(),
        pct.to_string(),
    ]
}

fn page(codes: &[&str], next: NextControl) -> Page {
    let mut rows = vec![vec![]]; // header row carries no <td> cells
    rows.extend(codes.iter().map(|c| data_row(c, "1,5")));
    Page { rows, next }
}

fn site() -> (SiteDriver, Arc<Mutex<Shared>>) {
    let shared = Arc::new(Mutex::new(Shared::default()));
    let driver = SiteDriver {
        pages: vec![
            page(&["P01", "P02", "P03", "P04", "P05"], NextControl::Ready),
            page(&["P06", "P07", "P08", "P09", "P10"], NextControl::Ready),
            page(&["P11", "P12", "P13"], NextControl::Disabled),
        ],
        shared: shared.clone(),
    };
    (driver, shared)
}

#[tokio::test(start_paused = true)]
async fn three_page_run_yields_thirteen_rows_in_order() {
    let (driver, shared) = site();
    let cfg = ScraperConfig::default();

    let dataset = PaginationController::new(driver, &cfg).run().await.unwrap();

    assert_eq!(dataset.len(), 13);

    let codes: Vec<_> = dataset.rows().iter().map(|r| r.code.as_str()).collect();
    let expected: Vec<String> = (1..=13).map(|i| format!("P{i:02}")).collect();
    assert_eq!(codes, expected);

    // Every row carries the same capture date.
    let first = dataset.rows().first().unwrap();
    assert!(
        dataset
            .rows()
            .iter()
            .all(|r| (r.year, r.month, r.day) == (first.year, first.month, first.day))
    );

    // Quantity cleaning applied on the way in.
    assert!(dataset.rows().iter().all(|r| r.theoretical_qty == 1_000_000));

    assert!(shared.lock().unwrap().closed);
}

#[tokio::test(start_paused = true)]
async fn scraped_dataset_exports_to_both_formats() {
    let (driver, _shared) = site();
    let cfg = ScraperConfig::default();

    let dataset = PaginationController::new(driver, &cfg).run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ibovespa.csv");
    let parquet_dir = dir.path().join("raw");

    export::export_csv(&dataset, &csv_path).unwrap();
    export::export_parquet(&dataset, &parquet_dir).unwrap();

    let bytes = fs::read(&csv_path).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    // Header plus 13 data lines.
    assert_eq!(text.lines().count(), 14);

    let first = dataset.rows().first().unwrap();
    let partition = parquet_dir
        .join(format!("ano={}", first.year))
        .join(format!("mes={}", first.month))
        .join(format!("dia={}", first.day))
        .join("dados-0.parquet");
    assert!(partition.exists());
}
