//! Core trait abstractions at the collaborator seams.

pub mod fetcher;
pub mod oracle;

pub use fetcher::{FetchOptions, PageFetcher};
pub use oracle::{AnomalyReport, SearchOracle};
