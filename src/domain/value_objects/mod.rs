//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_CURRENCY: &str = "VND";

/// Money value object. Amounts are kept in whole currency units (VND has no minor unit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn vnd(amount: i64) -> Self { Self::new(Decimal::from(amount), DEFAULT_CURRENCY) }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero(DEFAULT_CURRENCY) } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("currency mismatch")]
    CurrencyMismatch,
}

/// Shipping weight in whole grams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(u32);

impl Weight {
    pub const ZERO: Weight = Weight(0);

    pub fn grams(value: u32) -> Self { Self(value) }
    pub fn from_kg(kg: f64) -> Self { Self((kg.max(0.0) * 1000.0).round() as u32) }
    pub fn as_grams(&self) -> u32 { self.0 }
    pub fn kilograms(&self) -> f64 { f64::from(self.0) / 1000.0 }
    /// Whole kilograms, rounded up. Used for per-started-kilogram surcharges.
    pub fn ceil_kg(&self) -> u32 { self.0.div_ceil(1000) }
    pub fn add(&self, other: Weight) -> Self { Self(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: u32) -> Self { Self(self.0.saturating_mul(qty)) }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2} kg", self.kilograms()) }
}
