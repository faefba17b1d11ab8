// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:   Configuration structs loaded from JSON (with defaults)
// - schema:   Strongly typed record definitions shared by both pipelines
// - util:     Shared helper utilities (numeric cleaning, time handling)
// - metrics:  Lock-free runtime counters
// - sampler:  Pipeline A – live price ingestion and periodic sink flush
// - scraper:  Pipeline B – paginated table scraping and dataset export
//
pub mod config;
pub mod schema;
pub mod util;
pub mod metrics;
pub mod sampler;
pub mod scraper;
