//! Discount Fixtures

use jiff::civil::Date;
use serde::Deserialize;

/// Discounts YAML file
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Per-item discounts, in priority order
    #[serde(default)]
    pub items: Vec<ItemDiscountFixture>,

    /// Set discounts
    #[serde(default)]
    pub sets: Vec<SetDiscountFixture>,

    /// Cart-wide threshold discounts
    #[serde(default)]
    pub carts: Vec<CartDiscountFixture>,
}

/// A product or category reference. Exactly one field must be set.
#[derive(Debug, Deserialize)]
pub struct ScopeFixture {
    /// Product fixture key
    pub product: Option<String>,

    /// Category fixture key
    pub category: Option<String>,
}

/// Per-item discount fixture. Exactly one of `percent` and `amount` must be set.
#[derive(Debug, Deserialize)]
pub struct ItemDiscountFixture {
    /// Discount name
    pub name: String,

    /// What the discount applies to
    pub scope: ScopeFixture,

    /// Percentage off (e.g., "15%" or "0.15")
    pub percent: Option<String>,

    /// Amount off (e.g., "5.00 GBP")
    pub amount: Option<String>,

    /// Priority
    #[serde(default)]
    pub weight: i32,

    /// First active day
    pub start: Date,

    /// Last active day
    pub end: Date,
}

/// Set discount fixture
#[derive(Debug, Deserialize)]
pub struct SetDiscountFixture {
    /// Discount name
    pub name: String,

    /// The two scopes that must both be filled
    pub slots: [ScopeFixture; 2],

    /// Percentage off every cart item
    pub percent: String,

    /// Priority against other cart-level discounts
    #[serde(default)]
    pub weight: i32,

    /// First active day
    pub start: Date,

    /// Last active day
    pub end: Date,
}

/// Cart discount fixture
#[derive(Debug, Deserialize)]
pub struct CartDiscountFixture {
    /// Discount name
    pub name: String,

    /// Percentage off every cart item
    pub percent: String,

    /// Priority against other cart-level discounts
    #[serde(default)]
    pub weight: i32,

    /// Minimum item count
    #[serde(default)]
    pub min_items: usize,

    /// Maximum item count
    #[serde(default = "unbounded_items")]
    pub max_items: usize,

    /// Minimum cart cost (e.g., "50.00 GBP")
    pub min_cost: String,

    /// Maximum cart cost
    pub max_cost: String,

    /// First active day
    pub start: Date,

    /// Last active day
    pub end: Date,
}

fn unbounded_items() -> usize {
    usize::MAX
}
