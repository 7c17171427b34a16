//! Facet counts over a match set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::filters::SearchFilters;
use crate::domain::aggregates::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub categories: Vec<FacetValue>,
    pub brands: Vec<FacetValue>,
    pub price_ranges: Vec<FacetValue>,
    pub ratings: Vec<FacetValue>,
}

// Upper bounds in VND; the last bucket is open-ended.
const PRICE_BUCKETS: &[(&str, Option<i64>)] = &[
    ("0-1000000", Some(1_000_000)),
    ("1000000-5000000", Some(5_000_000)),
    ("5000000-10000000", Some(10_000_000)),
    ("10000000-20000000", Some(20_000_000)),
    ("20000000+", None),
];

const RATING_FLOORS: &[u8] = &[4, 3, 2];

fn price_bucket(price: Decimal) -> &'static str {
    PRICE_BUCKETS
        .iter()
        .find(|(_, upper)| upper.map_or(true, |u| price < Decimal::from(u)))
        .map_or("20000000+", |(label, _)| *label)
}

fn ranked(counts: HashMap<String, usize>, is_selected: impl Fn(&str) -> bool) -> Vec<FacetValue> {
    let mut values: Vec<FacetValue> = counts
        .into_iter()
        .map(|(value, count)| FacetValue { selected: is_selected(&value), value, count })
        .collect();
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    values
}

impl Facets {
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>, filters: &SearchFilters) -> Self {
        let mut categories: HashMap<String, usize> = HashMap::new();
        let mut brands: HashMap<String, usize> = HashMap::new();
        let mut prices: HashMap<&'static str, usize> = HashMap::new();
        let mut ratings = [0usize; 3];

        for p in products {
            if !p.category.is_empty() { *categories.entry(p.category.clone()).or_insert(0) += 1; }
            if !p.brand.is_empty() { *brands.entry(p.brand.clone()).or_insert(0) += 1; }
            *prices.entry(price_bucket(p.price.amount())).or_insert(0) += 1;
            for (slot, floor) in ratings.iter_mut().zip(RATING_FLOORS) {
                if p.rating >= f32::from(*floor) { *slot += 1; }
            }
        }

        let selected_range = filters.price_range.as_ref();
        Self {
            categories: ranked(categories, |v| filters.category.as_deref() == Some(v)),
            brands: ranked(brands, |v| filters.brands.iter().any(|b| b.to_lowercase() == v.to_lowercase())),
            price_ranges: PRICE_BUCKETS
                .iter()
                .map(|(label, _)| FacetValue {
                    value: label.to_string(),
                    count: prices.get(label).copied().unwrap_or(0),
                    selected: selected_range.is_some_and(|r| r.min.map(price_bucket) == Some(*label)),
                })
                .collect(),
            ratings: RATING_FLOORS
                .iter()
                .zip(ratings)
                .map(|(floor, count)| FacetValue {
                    value: format!("{floor}+"),
                    count,
                    selected: filters.min_rating == Some(f32::from(*floor)),
                })
                .collect(),
        }
    }
}
