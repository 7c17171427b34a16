//! Per-carrier quotes for a cart and destination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use super::carrier::{default_carriers, Carrier, CarrierCode};
use super::region::{resolve_province, DistanceTier, Province};
use crate::domain::aggregates::CartItem;
use crate::domain::value_objects::{Money, Weight};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub province: String,
    pub district: String,
}

impl Destination {
    pub fn new(province: &str, district: &str) -> Self {
        Self { province: province.to_string(), district: district.to_string() }
    }

    /// Quotes are only computed once both province and district are filled in.
    pub fn is_specified(&self) -> bool {
        !self.province.trim().is_empty() && !self.district.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub carrier: CarrierCode,
    pub carrier_name: String,
    pub cost: Money,
    pub estimated_days: u32,
    pub tracking: bool,
}

/// Quotes sorted by ascending cost, plus whether the order ships free.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingOptions {
    pub quotes: Vec<ShippingQuote>,
    pub free_shipping: bool,
    pub total_weight: Weight,
    pub distance: Option<DistanceTier>,
}

impl ShippingOptions {
    pub fn is_empty(&self) -> bool { self.quotes.is_empty() }

    pub fn cheapest(&self) -> Option<&ShippingQuote> { self.quotes.first() }

    /// The explicitly chosen carrier, or the cheapest quote when none was chosen.
    pub fn select(&self, carrier: Option<CarrierCode>) -> Result<&ShippingQuote, ShippingError> {
        match carrier {
            Some(code) => self.quotes.iter().find(|q| q.carrier == code).ok_or(ShippingError::CarrierNotOffered(code)),
            None => self.cheapest().ok_or(ShippingError::NoQuotes),
        }
    }

    /// Fee charged at checkout; zero once the subtotal reached the free-shipping threshold.
    pub fn effective_fee(&self, quote: &ShippingQuote) -> Money {
        if self.free_shipping { Money::zero(quote.cost.currency()) } else { quote.cost.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShippingError {
    #[error("unknown destination province: {0}")]
    UnknownDestination(String),
    #[error("unknown origin province: {0}")]
    UnknownOrigin(String),
    #[error("carrier {0} is not offered for this order")]
    CarrierNotOffered(CarrierCode),
    #[error("no shipping quotes available")]
    NoQuotes,
}

#[derive(Clone, Debug)]
pub struct ShippingCalculator {
    carriers: Vec<Carrier>,
    origin: Province,
    free_shipping_threshold: Money,
    default_unit_weight: Weight,
}

impl ShippingCalculator {
    pub fn new(origin: &str, free_shipping_threshold: Money, default_unit_weight: Weight) -> Result<Self, ShippingError> {
        let origin = resolve_province(origin).ok_or_else(|| ShippingError::UnknownOrigin(origin.to_string()))?;
        Ok(Self { carriers: default_carriers(), origin, free_shipping_threshold, default_unit_weight })
    }

    pub fn with_carriers(mut self, carriers: Vec<Carrier>) -> Self { self.carriers = carriers; self }

    pub fn origin(&self) -> &Province { &self.origin }
    pub fn free_shipping_threshold(&self) -> &Money { &self.free_shipping_threshold }

    pub fn qualifies_for_free_shipping(&self, subtotal: &Money) -> bool {
        subtotal.amount() >= self.free_shipping_threshold.amount()
    }

    /// Sum of `quantity * unit weight`; lines without a weight use the nominal default.
    pub fn total_weight(&self, items: &[CartItem]) -> Weight {
        items.iter().fold(Weight::ZERO, |acc, i| acc.add(i.weight.unwrap_or(self.default_unit_weight).multiply(i.quantity)))
    }

    #[instrument(skip(self, items), fields(lines = items.len(), province = %destination.province))]
    pub fn quote(&self, items: &[CartItem], subtotal: &Money, destination: &Destination) -> Result<ShippingOptions, ShippingError> {
        if items.is_empty() || !destination.is_specified() {
            return Ok(ShippingOptions::default());
        }
        let province = resolve_province(&destination.province)
            .ok_or_else(|| ShippingError::UnknownDestination(destination.province.clone()))?;
        let distance = DistanceTier::between(&self.origin, &province);
        let weight = self.total_weight(items);

        let mut quotes: Vec<ShippingQuote> = self.carriers.iter().map(|c| ShippingQuote {
            carrier: c.code,
            carrier_name: c.name.clone(),
            cost: Money::new(round_to_thousand(c.rates.base_cost(weight) * distance.factor()), subtotal.currency()),
            estimated_days: c.estimated_days,
            tracking: c.tracking,
        }).collect();
        quotes.sort_by(|a, b| a.cost.amount().cmp(&b.cost.amount()));

        let free_shipping = self.qualifies_for_free_shipping(subtotal);
        debug!(weight = weight.as_grams(), ?distance, free_shipping, quotes = quotes.len(), "computed shipping quotes");
        Ok(ShippingOptions { quotes, free_shipping, total_weight: weight, distance: Some(distance) })
    }
}

fn round_to_thousand(value: Decimal) -> Decimal {
    let thousand = Decimal::from(1_000);
    (value / thousand).round() * thousand
}
