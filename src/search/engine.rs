//! Filter, sort and paginate a catalog snapshot.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, instrument};

use super::facets::Facets;
use super::filters::{SearchFilters, SortKey, DEFAULT_PAGE_SIZE};
use super::suggest::Suggester;
use crate::domain::aggregates::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub total_count: usize,
    pub total_pages: usize,
    pub filters: SearchFilters,
    pub suggestions: Vec<String>,
    pub facets: Facets,
    pub took_ms: f64,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool { self.total_count == 0 }
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    suggester: Suggester,
    default_limit: u32,
}

impl Default for SearchEngine {
    fn default() -> Self { Self::new(Suggester::default(), DEFAULT_PAGE_SIZE) }
}

impl SearchEngine {
    pub fn new(suggester: Suggester, default_limit: u32) -> Self { Self { suggester, default_limit } }

    pub fn suggester(&self) -> &Suggester { &self.suggester }
    pub fn default_limit(&self) -> u32 { self.default_limit }

    #[instrument(skip_all, fields(query = %filters.query, page = filters.page))]
    pub fn search(&self, catalog: &[Product], filters: &SearchFilters) -> SearchResult {
        let started = Instant::now();
        let filters = filters.clone().normalized(self.default_limit);

        let mut matched: Vec<&Product> = catalog.iter().filter(|p| filters.matches(p)).collect();
        sort_products(&mut matched, filters.sort);

        let total_count = matched.len();
        let limit = filters.limit as usize;
        let start = (filters.page as usize - 1).saturating_mul(limit);
        let products: Vec<Product> = matched.iter().skip(start).take(limit).map(|p| (*p).clone()).collect();
        let facets = Facets::from_products(matched.iter().copied(), &filters);
        let suggestions = if filters.query.is_empty() { vec![] } else { self.suggester.suggest(&filters.query) };
        let took_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(total_count, returned = products.len(), took_ms, "search completed");
        SearchResult { products, total_count, total_pages: total_pages(total_count, filters.limit), filters, suggestions, facets, took_ms }
    }
}

/// `ceil(total / limit)`; 0 for an empty result.
pub fn total_pages(total: usize, limit: u32) -> usize {
    if limit == 0 { return 0; }
    total.div_ceil(limit as usize)
}

/// Stable sort; `Relevance` keeps the filtered order.
pub fn sort_products(items: &mut [&Product], key: SortKey) {
    let cmp: fn(&&Product, &&Product) -> Ordering = match key {
        SortKey::Relevance => return,
        SortKey::PriceAsc => |a, b| a.price.amount().cmp(&b.price.amount()),
        SortKey::PriceDesc => |a, b| b.price.amount().cmp(&a.price.amount()),
        SortKey::Rating => |a, b| b.rating.total_cmp(&a.rating),
        SortKey::Newest => |a, b| b.created_at.cmp(&a.created_at),
        SortKey::Popularity => |a, b| b.sold.cmp(&a.sold),
    };
    items.sort_by(cmp);
}
