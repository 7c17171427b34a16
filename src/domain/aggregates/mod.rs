//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod wishlist;

pub use product::{Product, ProductError};
pub use order::{Address, LineItem, Order, OrderError, OrderStatus, PlaceOrder};
pub use cart::{Cart, CartError, CartItem, MAX_LINE_QUANTITY};
pub use wishlist::Wishlist;
