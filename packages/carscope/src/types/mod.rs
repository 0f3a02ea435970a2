//! Request-scoped value types.
//!
//! Everything here is allocated per request and discarded after the
//! response is built; no cross-request shared mutable state.

pub mod context;
pub mod filters;
pub mod insights;
pub mod listing;
pub mod report;

pub use context::{PricePrediction, QueryEnhancement, SearchContext, StandardizedQuery};
pub use filters::SearchFilters;
pub use insights::{AggregateInsights, PriceRange};
pub use listing::{
    AiInsights, Confidence, EnrichedListing, ExtractionMeta, ListingSpecs, RawListing,
    Transmission,
};
pub use report::{Recommendation, SearchAnalysis, SearchReport};
