//! Domain events
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::shipping::TrackingNumber;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        match self {
            Self::Cart(e) => format!("vnshop.cart.{}", e.name()),
            Self::Order(e) => format!("vnshop.orders.{}", e.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { session_id: String, product_id: String, quantity: u32 },
    ItemRemoved { session_id: String, product_id: String },
    Cleared { session_id: String },
}

impl CartEvent {
    pub fn name(&self) -> &'static str {
        match self { Self::ItemAdded { .. } => "item_added", Self::ItemRemoved { .. } => "item_removed", Self::Cleared { .. } => "cleared" }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, order_number: String, total: Decimal },
    Confirmed { order_id: Uuid, tracking_number: TrackingNumber },
    Shipped { order_id: Uuid, tracking_number: Option<TrackingNumber> },
    Delivered { order_id: Uuid },
    Cancelled { order_id: Uuid },
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed", Self::Confirmed { .. } => "confirmed", Self::Shipped { .. } => "shipped",
            Self::Delivered { .. } => "delivered", Self::Cancelled { .. } => "cancelled",
        }
    }
}
