use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use log::info;

use crate::config::ScraperConfig;
use crate::scraper::driver::{NextControl, PageDriver};

// Selectors of the listing page. The "next" control is an <li>
// carrying a `disabled` class on the last page, with the clickable
// <a> nested inside it.
const TABLE: &str = "table";
const NEXT_ITEM: &str = ".pagination-next";
const MARKER_CELL: &str = "tbody tr:first-child td:first-child";

/// WebDriver-backed [`PageDriver`] implementation.
///
/// One instance owns one browser session for the whole run; the
/// pagination controller closes it on every exit path.
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Starts a session against the configured WebDriver endpoint
    /// and navigates to the listing URL.
    pub async fn open(cfg: &ScraperConfig) -> Result<Self> {
        let client = ClientBuilder::native()
            .connect(&cfg.webdriver_url)
            .await
            .with_context(|| format!("webdriver connect failed: {}", cfg.webdriver_url))?;

        info!("navigating to {}", cfg.url);
        client.goto(&cfg.url).await.context("initial navigation failed")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn table_rows(&mut self) -> Result<Option<Vec<Vec<String>>>> {
        let Some(table) = self
            .client
            .find_all(Locator::Css(TABLE))
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let mut rows = Vec::new();
        for row in table.find_all(Locator::Css("tr")).await? {
            let mut cells = Vec::new();
            for cell in row.find_all(Locator::Css("td")).await? {
                cells.push(cell.text().await?);
            }
            rows.push(cells);
        }

        Ok(Some(rows))
    }

    async fn marker_text(&mut self) -> Result<Option<String>> {
        let Some(cell) = self
            .client
            .find_all(Locator::Css(MARKER_CELL))
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        Ok(Some(cell.text().await?))
    }

    async fn next_control(&mut self) -> Result<NextControl> {
        let Some(item) = self
            .client
            .find_all(Locator::Css(NEXT_ITEM))
            .await?
            .into_iter()
            .next()
        else {
            return Ok(NextControl::Missing);
        };

        let class = item.attr("class").await?.unwrap_or_default();
        if class.split_whitespace().any(|c| c == "disabled") {
            return Ok(NextControl::Disabled);
        }

        // A control without its clickable anchor is unusable.
        if item.find_all(Locator::Css("a")).await?.is_empty() {
            return Ok(NextControl::Missing);
        }

        Ok(NextControl::Ready)
    }

    async fn click_next(&mut self) -> Result<()> {
        let item = self
            .client
            .find_all(Locator::Css(NEXT_ITEM))
            .await?
            .into_iter()
            .next()
            .context("next control disappeared before click")?;

        let anchor = item
            .find_all(Locator::Css("a"))
            .await?
            .into_iter()
            .next()
            .context("next control has no clickable anchor")?;

        anchor.click().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}
