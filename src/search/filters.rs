//! Search filter set, sort keys and filter edits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::Product;
use crate::i18n::Locale;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
    Popularity,
}

impl SortKey {
    /// Unknown keys fall back to relevance.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "newest" => Self::Newest,
            "popularity" | "popular" | "best_selling" => Self::Popularity,
            _ => Self::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
            Self::Newest => "newest",
            Self::Popularity => "popularity",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Relevance, Locale::Vi) => "Liên quan",
            (Self::Relevance, Locale::En) => "Relevance",
            (Self::PriceAsc, Locale::Vi) => "Giá thấp đến cao",
            (Self::PriceAsc, Locale::En) => "Price: Low to High",
            (Self::PriceDesc, Locale::Vi) => "Giá cao đến thấp",
            (Self::PriceDesc, Locale::En) => "Price: High to Low",
            (Self::Rating, Locale::Vi) => "Đánh giá cao nhất",
            (Self::Rating, Locale::En) => "Top Rated",
            (Self::Newest, Locale::Vi) => "Mới nhất",
            (Self::Newest, Locale::En) => "Newest",
            (Self::Popularity, Locale::Vi) => "Bán chạy",
            (Self::Popularity, Locale::En) => "Best Selling",
        }
    }
}

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self { Self { min: Some(min), max: Some(max) } }

    pub fn contains(&self, price: Decimal) -> bool {
        self.min.map_or(true, |m| price >= m) && self.max.map_or(true, |m| price <= m)
    }

    fn normalized(self) -> Option<Self> {
        match (self.min, self.max) {
            (None, None) => None,
            (Some(a), Some(b)) if a > b => Some(Self { min: Some(b), max: Some(a) }),
            _ => Some(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: String,
    pub category: Option<String>,
    pub brands: Vec<String>,
    pub price_range: Option<PriceRange>,
    pub min_rating: Option<f32>,
    pub in_stock: bool,
    pub on_sale: bool,
    pub tags: Vec<String>,
    pub sort: SortKey,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            query: String::new(), category: None, brands: vec![], price_range: None, min_rating: None,
            in_stock: false, on_sale: false, tags: vec![], sort: SortKey::Relevance, page: 1, limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One edit to a filter set. Every edit other than `Page` sends the user back to page 1.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Query(String),
    Category(Option<String>),
    Brands(Vec<String>),
    ToggleBrand(String),
    PriceRange(Option<PriceRange>),
    MinRating(Option<f32>),
    InStock(bool),
    OnSale(bool),
    Tags(Vec<String>),
    Sort(SortKey),
    Limit(u32),
    Page(u32),
    Reset,
}

impl SearchFilters {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    /// Clamps malformed values instead of rejecting them.
    pub fn normalized(mut self, default_limit: u32) -> Self {
        self.query = self.query.trim().to_string();
        self.page = self.page.max(1);
        if self.limit == 0 { self.limit = default_limit.clamp(1, MAX_PAGE_SIZE); }
        self.limit = self.limit.min(MAX_PAGE_SIZE);
        self.category = self.category.take().filter(|c| !c.trim().is_empty());
        self.brands.retain(|b| !b.trim().is_empty());
        self.tags.retain(|t| !t.trim().is_empty());
        self.price_range = self.price_range.take().and_then(PriceRange::normalized);
        self.min_rating = self.min_rating.filter(|r| r.is_finite()).map(|r| r.clamp(0.0, 5.0));
        self
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Page(p) => {
                self.page = p.max(1);
                return;
            }
            FilterChange::Query(q) => self.query = q,
            FilterChange::Category(c) => self.category = c,
            FilterChange::Brands(b) => self.brands = b,
            FilterChange::ToggleBrand(b) => {
                let before = self.brands.len();
                self.brands.retain(|x| x.to_lowercase() != b.to_lowercase());
                if self.brands.len() == before { self.brands.push(b); }
            }
            FilterChange::PriceRange(r) => self.price_range = r,
            FilterChange::MinRating(r) => self.min_rating = r,
            FilterChange::InStock(v) => self.in_stock = v,
            FilterChange::OnSale(v) => self.on_sale = v,
            FilterChange::Tags(t) => self.tags = t,
            FilterChange::Sort(s) => self.sort = s,
            FilterChange::Limit(l) => self.limit = l,
            FilterChange::Reset => *self = Self { limit: self.limit, ..Self::default() },
        }
        self.page = 1;
    }

    /// Case-insensitive substring match on name, brand, description or any tag.
    pub fn matches_query(&self, product: &Product) -> bool {
        if self.query.is_empty() { return true; }
        let q = self.query.to_lowercase();
        product.name.to_lowercase().contains(&q)
            || product.brand.to_lowercase().contains(&q)
            || product.description.to_lowercase().contains(&q)
            || product.tags.iter().any(|t| t.to_lowercase().contains(&q))
    }

    /// Structured facets; an item must pass every filter that is set.
    pub fn matches_facets(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category { return false; }
        }
        if !self.brands.is_empty() {
            let brand = product.brand.to_lowercase();
            if !self.brands.iter().any(|b| b.to_lowercase() == brand) { return false; }
        }
        if let Some(range) = &self.price_range {
            if !range.contains(product.price.amount()) { return false; }
        }
        if let Some(rating) = self.min_rating {
            if product.rating < rating { return false; }
        }
        if self.in_stock && !product.is_in_stock() { return false; }
        if self.on_sale && !product.is_on_sale() { return false; }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| product.has_tag(t)) { return false; }
        true
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.matches_query(product) && self.matches_facets(product)
    }
}

/// Raw query-string parameters, kept as text so that malformed input falls back
/// to defaults or is clamped by [`SearchFilters::normalized`] instead of failing
/// the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub brands: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub rating: Option<String>,
    pub in_stock: Option<String>,
    pub on_sale: Option<String>,
    pub tags: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

/// Non-negative count; fractions truncate, out-of-range values saturate, junk yields `None`.
pub fn lenient_count(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(u32::try_from(v.max(0)).unwrap_or(u32::MAX));
    }
    // `as` saturates for floats, which also covers integers too long for i64.
    raw.parse::<f64>().ok().filter(|v| !v.is_nan()).map(|v| v.max(0.0) as u32)
}

fn lenient_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(|r| r.trim().to_ascii_lowercase()).as_deref(), Some("true" | "1" | "yes" | "on"))
}

fn lenient_decimal(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|r| r.trim().parse::<Decimal>().ok())
}

impl SearchParams {
    pub fn into_filters(self, default_limit: u32) -> SearchFilters {
        let price_range = match (lenient_decimal(self.min_price.as_deref()), lenient_decimal(self.max_price.as_deref())) {
            (None, None) => None,
            (min, max) => Some(PriceRange { min, max }),
        };
        SearchFilters {
            query: self.q.unwrap_or_default(),
            category: self.category,
            brands: split_list(self.brands),
            price_range,
            min_rating: self.rating.as_deref().and_then(|r| r.trim().parse::<f32>().ok()),
            in_stock: lenient_flag(self.in_stock.as_deref()),
            on_sale: lenient_flag(self.on_sale.as_deref()),
            tags: split_list(self.tags),
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page: lenient_count(self.page.as_deref()).unwrap_or(1),
            limit: lenient_count(self.limit.as_deref()).unwrap_or(0),
        }
        .normalized(default_limit)
    }
}
