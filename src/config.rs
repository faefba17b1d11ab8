use serde::Deserialize;
use std::fs;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Top-level configuration loaded from `config.json`.
//
// Both binaries run without CLI arguments. When no config file is
// present, compiled-in defaults are used; they match the production
// constants (feed URL, delivery stream, scrape URL, output paths).
//
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Pipeline A: live price sampler
    pub sampler: SamplerConfig,

    /// Pipeline B: paginated table scraper
    pub scraper: ScraperConfig,
}

impl Config {
    /// Loads the configuration from disk, falling back to defaults
    /// when the file does not exist.
    ///
    /// A present-but-malformed file is an error: running production
    /// constants against a stale environment must not happen silently.
    pub fn load(path: &str) -> anyhow::Result<Config> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }
}

// ------------------------------------------------------------
// Sampler configuration (Pipeline A)
// ------------------------------------------------------------
//
// Defines the trade feed subscription and the Firehose sink.
//
// Notes:
// - `feed_url` already carries the symbol/topic; one subscription only.
// - `flush_interval_secs` decouples sink cadence from tick arrival rate.
// - `reconnect_delay_secs` applies on transport error AND on feed close.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplerConfig {
    /// WebSocket URL of the trade feed (venue + topic)
    pub feed_url: String,

    /// Firehose delivery stream receiving the sampled records
    pub stream_name: String,

    /// AWS region of the delivery stream
    pub region: String,

    /// Seconds between sink flushes
    pub flush_interval_secs: u64,

    /// Seconds to wait before re-dialing the feed
    pub reconnect_delay_secs: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            feed_url: "wss://stream.binance.com:9443/ws/btcusdt@trade".to_string(),
            stream_name: "bitcoin_firehose".to_string(),
            region: "us-east-1".to_string(),
            flush_interval_secs: 60,
            reconnect_delay_secs: 5,
        }
    }
}

// ------------------------------------------------------------
// Scraper configuration (Pipeline B)
// ------------------------------------------------------------
//
// Defines the listing URL, the WebDriver endpoint and the bounded
// waits of the pagination state machine.
//
// The wait budgets are part of the termination contract:
// - `table_wait_secs`:      per-page table presence (extractor)
// - `initial_wait_secs`:    first page load
// - `transition_wait_secs`: marker-cell change after clicking "next"
//
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listing URL of the index composition
    pub url: String,

    /// WebDriver endpoint (e.g. chromedriver)
    pub webdriver_url: String,

    /// Seconds to wait for the data table on each page
    pub table_wait_secs: u64,

    /// Seconds to wait for the initial page load
    pub initial_wait_secs: u64,

    /// Seconds to wait for a page transition to complete
    pub transition_wait_secs: u64,

    /// Milliseconds between condition polls
    pub poll_interval_ms: u64,

    /// Destination of the CSV export
    pub csv_path: String,

    /// Destination directory of the partitioned parquet export
    pub parquet_dir: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: "https://sistemaswebb3-listados.b3.com.br/indexPage/day/IBOV?language=pt-br"
                .to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            table_wait_secs: 10,
            initial_wait_secs: 30,
            transition_wait_secs: 15,
            poll_interval_ms: 500,
            csv_path: "ibovespa.csv".to_string(),
            parquet_dir: "ibovespa_raw".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_production_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.sampler.flush_interval_secs, 60);
        assert_eq!(cfg.sampler.stream_name, "bitcoin_firehose");
        assert_eq!(cfg.scraper.transition_wait_secs, 15);
    }

    #[test]
    fn partial_config_falls_back_per_field() {
        let cfg: Config =
            serde_json::from_str(r#"{"sampler":{"flush_interval_secs":5}}"#).unwrap();
        assert_eq!(cfg.sampler.flush_interval_secs, 5);
        assert_eq!(cfg.sampler.region, "us-east-1");
        assert_eq!(cfg.scraper.table_wait_secs, 10);
    }
}
