//! Market Offers
//!
//! A market offer is a single seller's listing of a product at its own price.

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::products::ProductKey;

new_key_type! {
    /// Seller Key
    pub struct SellerKey;
}

new_key_type! {
    /// Offer Key
    pub struct OfferKey;
}

/// Seller
#[derive(Debug, Clone)]
pub struct Seller {
    /// Seller title, as shown in the storefront
    pub title: String,
}

/// A (product, seller) listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOffer<'a> {
    /// Product being offered
    pub product: ProductKey,

    /// Seller offering the product
    pub seller: SellerKey,

    /// Seller's price
    pub price: Money<'a, Currency>,

    /// Units the seller has in stock
    pub quantity: u32,

    /// Whether the seller delivers for free
    pub free_delivery: bool,
}

impl<'a> MarketOffer<'a> {
    /// Create a new offer with no stock and paid delivery.
    pub fn new(product: ProductKey, seller: SellerKey, price: Money<'a, Currency>) -> Self {
        Self {
            product,
            seller,
            price,
            quantity: 0,
            free_delivery: false,
        }
    }

    /// Set the quantity in stock.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Mark the offer as delivered for free.
    #[must_use]
    pub fn with_free_delivery(mut self) -> Self {
        self.free_delivery = true;
        self
    }

    /// Whether the seller has at least one unit in stock.
    pub fn in_stock(&self) -> bool {
        self.quantity >= 1
    }
}
