//! Shipping rate calculator.
//!
//! Quotes are computed fresh for every request from the cart snapshot, the
//! order subtotal and the destination; nothing here is persisted.

pub mod calculator;
pub mod carrier;
pub mod region;
pub mod tracking;

pub use calculator::{Destination, ShippingCalculator, ShippingError, ShippingOptions, ShippingQuote};
pub use carrier::{default_carriers, Carrier, CarrierCode, RateTable};
pub use region::{resolve_province, DistanceTier, Province, Region};
pub use tracking::{estimated_delivery, TrackingNumber};
