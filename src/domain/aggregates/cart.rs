//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, Weight, DEFAULT_CURRENCY};

/// Most units of one product a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: String,
    updated_at: DateTime<Utc>,
}

/// A cart line. `quantity` is always at least 1; a line that would drop to 0 is removed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(), name: product.name.clone(), unit_price: product.price.clone(),
            weight: product.weight, image: product.images.first().cloned(), quantity,
        }
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Default for Cart { fn default() -> Self { Self::new(DEFAULT_CURRENCY) } }

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], currency: currency.to_string(), updated_at: Utc::now() }
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn line_count(&self) -> usize { self.items.len() }
    /// Total units across all lines.
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items.iter().find(|i| i.product_id == product_id).map_or(0, |i| i.quantity)
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_total()).unwrap_or(acc))
    }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity); }
        if item.unit_price.currency() != self.currency { return Err(CartError::CurrencyMismatch); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
        Ok(())
    }

    /// Like [`Cart::add_item`], but the merged line must fit within `stock` and
    /// [`MAX_LINE_QUANTITY`].
    pub fn add_in_stock(&mut self, item: CartItem, stock: u32) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity); }
        check_available(self.quantity_of(&item.product_id).saturating_add(item.quantity), stock)?;
        self.add_item(item)
    }

    /// Like [`Cart::update_quantity`], bounded the same way as [`Cart::add_in_stock`].
    pub fn set_in_stock(&mut self, product_id: &str, quantity: u32, stock: u32) -> Result<(), CartError> {
        if quantity > 0 { check_available(quantity, stock)?; }
        self.update_quantity(product_id, quantity)
    }

    /// Removes one unit; the line disappears with its last unit.
    pub fn decrement(&mut self, product_id: &str) -> Result<(), CartError> {
        let pos = self.items.iter().position(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if self.items[pos].quantity <= 1 { self.items.remove(pos); } else { self.items[pos].quantity -= 1; }
        self.touch();
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 { self.items.retain(|i| i.product_id != product_id); }
        else { item.quantity = quantity; }
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.touch(); }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn check_available(wanted: u32, stock: u32) -> Result<(), CartError> {
    if wanted > MAX_LINE_QUANTITY { return Err(CartError::QuantityLimit(MAX_LINE_QUANTITY)); }
    if wanted > stock { return Err(CartError::OutOfStock { available: stock }); }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("item not found in cart")]
    ItemNotFound,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("item currency does not match cart currency")]
    CurrencyMismatch,
    #[error("only {available} left in stock")]
    OutOfStock { available: u32 },
    #[error("at most {0} units per item")]
    QuantityLimit(u32),
}
