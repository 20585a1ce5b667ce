//! Cart Fixtures

use serde::Deserialize;

/// Cart YAML file
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in the order they were added
    pub lines: Vec<CartLineFixture>,
}

/// One cart line.
///
/// The listed price is `price` when given, otherwise the named seller's offer price, otherwise
/// the product's reference price.
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product fixture key
    pub product: String,

    /// Explicit listed price (e.g., "12.50 GBP")
    pub price: Option<String>,

    /// Seller fixture key whose offer the product was added from
    pub seller: Option<String>,
}
