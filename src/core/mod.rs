//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod contribution;
pub mod error;
pub mod log;
pub mod price;
pub mod simulation;
pub mod streak;

// Re-export main types for cleaner imports
pub use cache::{CacheEntry, CacheKey, CachedPayload, PriceCache};
pub use contribution::{ContributionEvent, NormalizationReport, RawRecord};
pub use error::{AllProvidersFailedError, IssueCode, ProviderError, StructuralInputError};
pub use price::{PricePoint, PriceSeries, PriceSource, Quote};
