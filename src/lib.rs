//! VNShop storefront
//!
//! Vietnamese-first storefront backend serving a single-page client.
//!
//! ## Features
//! - Faceted catalog search with fuzzy scoring and suggestions
//! - Shopping cart, wishlist and user session persisted per client session
//! - Shipping quotes across Vietnamese carriers with free-shipping threshold
//! - Checkout, order tracking and a back-office dashboard

use thiserror::Error;

pub mod analytics;
pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod health;
pub mod i18n;
pub mod notify;
pub mod search;
pub mod shipping;
pub mod store;

use catalog::CatalogError;
use config::ConfigError;
use domain::aggregates::{CartError, OrderError, ProductError};
use domain::value_objects::MoneyError;
use shipping::ShippingError;
use store::StorageError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Shipping(#[from] ShippingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
