//! Wishlist Aggregate

use serde::{Deserialize, Serialize};

/// Ordered set of product ids, most recently added last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    product_ids: Vec<String>,
}

impl Wishlist {
    pub fn product_ids(&self) -> &[String] { &self.product_ids }
    pub fn len(&self) -> usize { self.product_ids.len() }
    pub fn is_empty(&self) -> bool { self.product_ids.is_empty() }
    pub fn contains(&self, product_id: &str) -> bool { self.product_ids.iter().any(|p| p == product_id) }

    /// Adds the product when absent, removes it otherwise. Returns whether it is now wishlisted.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.remove(product_id) { return false; }
        self.product_ids.push(product_id.to_string());
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|p| p != product_id);
        self.product_ids.len() != before
    }
}
