//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::Cart;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;
use crate::shipping::{estimated_delivery, CarrierCode, Destination, ShippingQuote, TrackingNumber};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    order_number: String,
    session_id: String,
    email: String,
    status: OrderStatus,
    items: Vec<LineItem>,
    subtotal: Money,
    shipping_quoted: Money,
    shipping_fee: Money,
    total: Money,
    shipping_address: Address,
    carrier: CarrierCode,
    estimated_days: u32,
    tracking_number: Option<TrackingNumber>,
    estimated_delivery: Option<DateTime<Utc>>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)] pub struct LineItem { pub product_id: String, pub name: String, pub quantity: u32, pub unit_price: Money, pub total: Money }

/// Vietnamese postal address: street, ward (phường/xã), district (quận/huyện), province (tỉnh/thành phố).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address { pub recipient: String, pub phone: String, pub street: String, #[serde(default)] pub ward: Option<String>, pub district: String, pub province: String }

impl Address {
    pub fn destination(&self) -> Destination { Destination::new(&self.province, &self.district) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Confirmed, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending", Self::Confirmed => "confirmed", Self::Shipped => "shipped",
            Self::Delivered => "delivered", Self::Cancelled => "cancelled",
        }
    }
}

/// Inputs for placing an order; the shipping fee is already resolved against the free-shipping rule.
#[derive(Clone, Debug)]
pub struct PlaceOrder<'a> {
    pub session_id: &'a str,
    pub email: &'a str,
    pub cart: &'a Cart,
    pub address: Address,
    pub quote: &'a ShippingQuote,
    pub shipping_fee: Money,
    pub note: Option<String>,
}

impl Order {
    pub fn place(cmd: PlaceOrder<'_>) -> Result<Self, OrderError> {
        if cmd.cart.is_empty() { return Err(OrderError::NoItems); }
        let now = Utc::now();
        let items: Vec<LineItem> = cmd.cart.items().iter().map(|i| LineItem {
            product_id: i.product_id.clone(), name: i.name.clone(), quantity: i.quantity,
            unit_price: i.unit_price.clone(), total: i.line_total(),
        }).collect();
        let subtotal = cmd.cart.subtotal();
        let total = subtotal.add(&cmd.shipping_fee).map_err(|_| OrderError::CurrencyMismatch)?;
        let mut order = Self {
            id: Uuid::now_v7(), order_number: format!("VN{}{:06}", now.format("%y%m%d"), rand::random::<u32>() % 1_000_000),
            session_id: cmd.session_id.to_string(), email: cmd.email.to_string(), status: OrderStatus::Pending,
            items, subtotal, shipping_quoted: cmd.quote.cost.clone(), shipping_fee: cmd.shipping_fee, total,
            shipping_address: cmd.address, carrier: cmd.quote.carrier, estimated_days: cmd.quote.estimated_days,
            tracking_number: None, estimated_delivery: None, note: cmd.note, created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id, order_number: order.order_number.clone(), total: order.total.amount(),
        }));
        Ok(order)
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn email(&self) -> &str { &self.email }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    /// Fee the carrier quoted, kept for display even when shipping is waived.
    pub fn shipping_quoted(&self) -> &Money { &self.shipping_quoted }
    /// Fee actually charged.
    pub fn shipping_fee(&self) -> &Money { &self.shipping_fee }
    pub fn total(&self) -> &Money { &self.total }
    pub fn shipping_address(&self) -> &Address { &self.shipping_address }
    pub fn carrier(&self) -> CarrierCode { self.carrier }
    pub fn tracking_number(&self) -> Option<&TrackingNumber> { self.tracking_number.as_ref() }
    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> { self.estimated_delivery }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Confirms the order and synthesizes its tracking number and delivery estimate.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        self.expect_status(OrderStatus::Pending, OrderStatus::Confirmed)?;
        let tracking = TrackingNumber::generate(self.carrier, now);
        self.estimated_delivery = Some(estimated_delivery(now, self.estimated_days));
        self.tracking_number = Some(tracking.clone());
        self.status = OrderStatus::Confirmed;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Confirmed { order_id: self.id, tracking_number: tracking }));
        Ok(())
    }

    pub fn ship(&mut self) -> Result<(), OrderError> {
        self.expect_status(OrderStatus::Confirmed, OrderStatus::Shipped)?;
        self.status = OrderStatus::Shipped;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Shipped { order_id: self.id, tracking_number: self.tracking_number.clone() }));
        Ok(())
    }

    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.expect_status(OrderStatus::Shipped, OrderStatus::Delivered)?;
        self.status = OrderStatus::Delivered;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Delivered { order_id: self.id }));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if matches!(self.status, OrderStatus::Delivered | OrderStatus::Cancelled) {
            return Err(OrderError::InvalidTransition { from: self.status, to: OrderStatus::Cancelled });
        }
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id }));
        Ok(())
    }

    /// Moves to `target` through the matching lifecycle step.
    pub fn transition_to(&mut self, target: OrderStatus, now: DateTime<Utc>) -> Result<(), OrderError> {
        match target {
            OrderStatus::Confirmed => self.confirm(now),
            OrderStatus::Shipped => self.ship(),
            OrderStatus::Delivered => self.deliver(),
            OrderStatus::Cancelled => self.cancel(),
            OrderStatus::Pending => Err(OrderError::InvalidTransition { from: self.status, to: target }),
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }

    fn expect_status(&self, expected: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if self.status != expected { return Err(OrderError::InvalidTransition { from: self.status, to }); }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("shipping fee currency does not match order currency")]
    CurrencyMismatch,
    #[error("cannot move order from {} to {}", from.as_str(), to.as_str())]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
