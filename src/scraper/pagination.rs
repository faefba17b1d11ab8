use std::sync::atomic::Ordering;

use log::{info, warn};
use thiserror::Error;
use tokio::time::{Duration, Instant, sleep};

use crate::config::ScraperConfig;
use crate::metrics::METRICS;
use crate::schema::Dataset;
use crate::scraper::driver::{NextControl, PageDriver};
use crate::scraper::extractor::PageExtractor;

/// Terminal failures of a scrape run.
///
/// A timeout while waiting for a page transition is NOT end-of-data:
/// rows were already appended for the current page and silently
/// truncating the dataset would look like a clean run. Both timeouts
/// abort and surface to the caller; the partial dataset is discarded.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("initial page never rendered a table within {0:?}")]
    InitialLoadTimeout(Duration),

    #[error("page transition stalled: marker cell unchanged within {0:?}")]
    TransitionTimeout(Duration),

    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

/// Pagination state machine.
///
/// AwaitingInitialLoad -> ExtractingPage     table present in budget
/// AwaitingInitialLoad -> Aborted            budget exceeded
/// ExtractingPage      -> Done               zero rows (after one
///                                           retry), or no usable
///                                           "next" control, or the
///                                           control is disabled
/// ExtractingPage      -> AwaitingTransition control invoked
/// AwaitingTransition  -> ExtractingPage     marker cell changed
/// AwaitingTransition  -> Aborted            budget exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    AwaitingInitialLoad,
    ExtractingPage,
    AwaitingTransition,
    Done,
    Aborted,
}

/// Drives the browser through every page of the listing and
/// accumulates the extracted rows.
///
/// OWNERSHIP:
/// - The controller exclusively owns the driver for the whole run
///   and releases it on every exit path (Done, Aborted, or a driver
///   error); a close failure is logged, never masks the outcome.
pub struct PaginationController<D: PageDriver> {
    driver: D,
    extractor: PageExtractor,
    initial_wait: Duration,
    transition_wait: Duration,
    poll: Duration,
    empty_retry_delay: Duration,
}

impl<D: PageDriver> PaginationController<D> {
    pub fn new(driver: D, cfg: &ScraperConfig) -> Self {
        Self {
            driver,
            extractor: PageExtractor::new(cfg),
            initial_wait: Duration::from_secs(cfg.initial_wait_secs),
            transition_wait: Duration::from_secs(cfg.transition_wait_secs),
            poll: Duration::from_millis(cfg.poll_interval_ms),
            empty_retry_delay: Duration::from_secs(2),
        }
    }

    /// Runs pagination to completion and returns the dataset.
    pub async fn run(mut self) -> Result<Dataset, ScrapeError> {
        let outcome = self.drive().await;

        if let Err(e) = self.driver.close().await {
            warn!("browser close failed: {e}");
        }

        outcome
    }

    async fn drive(&mut self) -> Result<Dataset, ScrapeError> {
        let mut state = PageState::AwaitingInitialLoad;
        let mut dataset = Dataset::new();
        let mut marker: Option<String> = None;
        let mut abort: Option<ScrapeError> = None;
        let mut page_no = 1usize;
        let mut retried_empty = false;

        loop {
            state = match state {
                PageState::AwaitingInitialLoad => {
                    if self.await_initial_table().await? {
                        PageState::ExtractingPage
                    } else {
                        abort = Some(ScrapeError::InitialLoadTimeout(self.initial_wait));
                        PageState::Aborted
                    }
                }

                PageState::ExtractingPage => {
                    info!("scraping page {page_no}");
                    let rows = self.extractor.extract(&mut self.driver).await?;

                    if rows.is_empty() {
                        if retried_empty {
                            info!("no rows on page {page_no}, treating as end of data");
                            PageState::Done
                        } else {
                            // One retry distinguishes a transient render
                            // glitch from the genuine last page.
                            warn!("no rows on page {page_no}, retrying once");
                            retried_empty = true;
                            sleep(self.empty_retry_delay).await;
                            PageState::ExtractingPage
                        }
                    } else {
                        retried_empty = false;
                        info!("found {} assets on page {page_no}", rows.len());
                        METRICS.pages_scraped.fetch_add(1, Ordering::Relaxed);
                        dataset.push_page(rows);

                        match self.driver.next_control().await? {
                            NextControl::Missing => {
                                info!("no usable next control, finishing");
                                PageState::Done
                            }
                            NextControl::Disabled => {
                                info!("reached the last page, finishing");
                                PageState::Done
                            }
                            NextControl::Ready => {
                                marker = self.driver.marker_text().await?;
                                self.driver.click_next().await?;
                                info!("clicked next, awaiting page {} load", page_no + 1);
                                PageState::AwaitingTransition
                            }
                        }
                    }
                }

                PageState::AwaitingTransition => {
                    if self.await_marker_change(marker.as_deref()).await? {
                        page_no += 1;
                        PageState::ExtractingPage
                    } else {
                        abort = Some(ScrapeError::TransitionTimeout(self.transition_wait));
                        PageState::Aborted
                    }
                }

                PageState::Done => {
                    info!("scrape finished: {} rows over {page_no} pages", dataset.len());
                    return Ok(dataset);
                }

                PageState::Aborted => {
                    let e = abort.take().unwrap_or_else(|| {
                        ScrapeError::Driver(anyhow::anyhow!("aborted without cause"))
                    });
                    warn!("scrape aborted: {e}");
                    return Err(e);
                }
            };
        }
    }

    /// Bounded wait for the first page's table. False on timeout.
    async fn await_initial_table(&mut self) -> Result<bool, ScrapeError> {
        let deadline = Instant::now() + self.initial_wait;

        loop {
            if self.driver.table_rows().await?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll).await;
        }
    }

    /// Bounded wait for the marker cell to differ from its pre-click
    /// value. False on timeout.
    ///
    /// A vanished marker (table mid-re-render) counts as changed; the
    /// next extraction waits for the new table on its own budget.
    async fn await_marker_change(&mut self, before: Option<&str>) -> Result<bool, ScrapeError> {
        let deadline = Instant::now() + self.transition_wait;

        loop {
            if self.driver.marker_text().await?.as_deref() != before {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.poll).await;
        }
    }
}
