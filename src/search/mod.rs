//! Client-side faceted search.
//!
//! Text match, structured filters, stable sort and pagination over a catalog
//! snapshot, plus a weighted fuzzy scorer and query suggestions.

pub mod engine;
pub mod facets;
pub mod filters;
pub mod fuzzy;
pub mod suggest;

pub use engine::{sort_products, total_pages, SearchEngine, SearchResult};
pub use facets::{FacetValue, Facets};
pub use filters::{lenient_count, FilterChange, PriceRange, SearchFilters, SearchParams, SortKey, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use fuzzy::{fuzzy_search, ScoredProduct};
pub use suggest::{Debouncer, Suggester, DEFAULT_SUGGESTION_LIMIT, SUGGESTION_DEBOUNCE};
