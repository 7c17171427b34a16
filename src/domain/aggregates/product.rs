//! Product (catalog item)
//!
//! Products are read-only snapshots materialized from the catalog source. The
//! search engine and the shipping calculator only ever borrow them.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use crate::domain::value_objects::{Money, Weight};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub sold: u32,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub weight: Option<Weight>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(), name: name.into(), description: String::new(), price, original_price: None,
            category: String::new(), brand: String::new(), rating: 0.0, review_count: 0, sold: 0, stock: 0,
            tags: vec![], specifications: BTreeMap::new(), images: vec![], weight: None, created_at: Utc::now(),
        }
    }

    pub fn is_in_stock(&self) -> bool { self.stock > 0 }

    /// On sale means an original price strictly above the current one.
    pub fn is_on_sale(&self) -> bool {
        self.original_price.as_ref().is_some_and(|o| o.amount() > self.price.amount())
    }

    /// Whole-percent discount against the original price, 0 when not on sale.
    pub fn discount_percent(&self) -> u32 {
        match &self.original_price {
            Some(o) if self.is_on_sale() && !o.amount().is_zero() => {
                let pct = (o.amount() - self.price.amount()) * Decimal::from(100) / o.amount();
                pct.round().to_u32().unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() { return Err(ProductError::MissingName); }
        if self.price.amount().is_sign_negative() { return Err(ProductError::NegativePrice); }
        if let Some(original) = &self.original_price {
            if original.currency() != self.price.currency() { return Err(ProductError::CurrencyMismatch); }
            if self.price.amount() > original.amount() { return Err(ProductError::PriceAboveOriginal); }
        }
        if !(0.0..=5.0).contains(&self.rating) { return Err(ProductError::RatingOutOfRange); }
        Ok(())
    }

    // Builder-style setters used by fixtures and the Postgres mapper.
    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_original_price(mut self, original: Money) -> Self { self.original_price = Some(original); self }
    pub fn with_category(mut self, category: impl Into<String>) -> Self { self.category = category.into(); self }
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self { self.brand = brand.into(); self }
    pub fn with_rating(mut self, rating: f32, review_count: u32) -> Self { self.rating = rating; self.review_count = review_count; self }
    pub fn with_sold(mut self, sold: u32) -> Self { self.sold = sold; self }
    pub fn with_stock(mut self, stock: u32) -> Self { self.stock = stock; self }
    pub fn with_tags<I, S>(mut self, tags: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> {
        self.tags = tags.into_iter().map(Into::into).collect(); self
    }
    pub fn with_spec(mut self, key: impl Into<String>, value: impl Into<String>) -> Self { self.specifications.insert(key.into(), value.into()); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.images.push(url.into()); self }
    pub fn with_weight(mut self, weight: Weight) -> Self { self.weight = Some(weight); self }
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self { self.created_at = at; self }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name is missing")]
    MissingName,
    #[error("price must not be negative")]
    NegativePrice,
    #[error("price exceeds original price")]
    PriceAboveOriginal,
    #[error("price and original price use different currencies")]
    CurrencyMismatch,
    #[error("rating must be between 0 and 5")]
    RatingOutOfRange,
}
