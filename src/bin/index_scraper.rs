// ------------------------------------------------------------
// Index composition scraper entry point (Pipeline B)
// ------------------------------------------------------------
//
// Responsibilities:
// - Load configuration
// - Open the browser session and walk every listing page
// - Export the accumulated dataset (CSV + partitioned parquet)
//
// The run is strictly sequential; an aborted pagination exits with
// an error and no exports.
//
use log::{info, warn};

use b3_market_collectors::config::Config;
use b3_market_collectors::schema::Dataset;
use b3_market_collectors::scraper::{
    export, pagination::PaginationController, webdriver::WebDriverPage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = Config::load("config.json")?.scraper;
    info!("starting index scraper: {}", cfg.url);

    let driver = WebDriverPage::open(&cfg).await?;
    let dataset = PaginationController::new(driver, &cfg).run().await?;

    if dataset.is_empty() {
        warn!("scrape produced no rows, skipping exports");
        return Ok(());
    }

    log_samples(&dataset);
    info!("total assets scraped: {}", dataset.len());

    export::export_all(&dataset, &cfg)?;
    Ok(())
}

/// Logs the first and last few rows as a quick sanity sample.
fn log_samples(dataset: &Dataset) {
    let rows = dataset.rows();

    for row in rows.iter().take(5) {
        info!("head: {} {} {:.3}%", row.code, row.name, row.participation_pct);
    }

    if rows.len() > 5 {
        for row in rows.iter().skip(rows.len().saturating_sub(5)) {
            info!("tail: {} {} {:.3}%", row.code, row.name, row.participation_pct);
        }
    }
}
