//! Storefront domain: value objects, aggregates and the events they raise.
pub mod value_objects;
pub mod aggregates;
pub mod events;
