//! Storefront
//!
//! Storefront resolves prices for a multi-seller catalog: per-item discounts, cart-wide
//! threshold and set discounts, catalog listing, product comparison, view history and reviews.

pub mod cart;
pub mod catalog;
pub mod compare;
pub mod customers;
pub mod discounts;
pub mod fixtures;
pub mod history;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod reviews;
