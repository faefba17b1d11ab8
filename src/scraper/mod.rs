/// Scraper module (Pipeline B)
///
/// This module groups all logic responsible for:
/// - Driving the browser through the paginated listing
/// - Extracting typed rows from each rendered page
/// - Accumulating and exporting the final dataset
///
/// The control flow is strictly sequential; the only suspension
/// points are the bounded waits for element presence and page
/// transitions.
///
/// Design notes:
/// - All browser access goes through the `PageDriver` trait so the
///   pagination state machine is testable with scripted fakes
/// - A timeout is terminal: either a clean end of data or an abort,
///   never a silent retry
pub mod driver;
pub mod webdriver;
pub mod extractor;
pub mod pagination;
pub mod export;
