//! Multi-source car listing aggregation.
//!
//! Scrapes several marketplace platforms concurrently, fuses the noisy
//! results into one deduplicated set, and ranks them with explainable
//! multi-factor scores. The pipeline is stateless per request and
//! tolerates partial failure: a platform that errors, times out, or
//! yields nothing never takes the request down with it.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use carscope::fetchers::HttpFetcher;
//! use carscope::orchestrator::SearchOrchestrator;
//! use carscope::types::SearchFilters;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = SearchOrchestrator::new(
//!     Arc::new(HttpFetcher::new()),
//!     carscope::oracle::from_env().into(),
//! );
//! let filters = SearchFilters::for_model("Corolla").with_brand("Toyota");
//! let report = orchestrator.search(&filters).await?;
//! println!("{} results", report.results.len());
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetchers;
pub mod insights;
pub mod oracle;
pub mod orchestrator;
pub mod page;
pub mod price;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{FetchError, OracleError, SearchError};
pub use orchestrator::SearchOrchestrator;
pub use types::{EnrichedListing, RawListing, SearchFilters, SearchReport};
