use anyhow::Result;
use async_trait::async_trait;

/// State of the pagination "next" control on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    /// No usable control exists on the page
    Missing,

    /// The control exists but is marked disabled (last page)
    Disabled,

    /// The control exists and can be invoked
    Ready,
}

/// PageDriver is the abstraction layer between:
/// - The sequential scrape state machine
/// - The browser automation surface
///
/// Every method is a single lookup attempt against the currently
/// rendered page; the bounded polling loops live in the extractor
/// and the pagination controller, NOT here. That split keeps the
/// termination logic deterministic under a scripted fake.
///
/// MUST NOT:
/// - Sleep or poll internally
/// - Retry failed lookups
///
#[async_trait]
pub trait PageDriver: Send {
    /// Returns the cell text of every row of the data table, header
    /// row included, or None while no table is present in the DOM.
    async fn table_rows(&mut self) -> Result<Option<Vec<Vec<String>>>>;

    /// Text of the first data cell (first row, first column), used
    /// as the marker for page-transition detection. None while the
    /// table body is absent.
    async fn marker_text(&mut self) -> Result<Option<String>>;

    /// Inspects the pagination "next" control.
    async fn next_control(&mut self) -> Result<NextControl>;

    /// Invokes the "next" control.
    ///
    /// Callers must have seen `NextControl::Ready` on this page; the
    /// driver does not re-check.
    async fn click_next(&mut self) -> Result<()>;

    /// Releases the underlying browser resource.
    ///
    /// Called exactly once, on every exit path of the controller.
    async fn close(&mut self) -> Result<()>;
}
