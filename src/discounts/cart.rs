//! Cart Discounts
//!
//! A cart-wide threshold discount takes a percentage off every item when the cart's item count
//! and total cost both fall within its bounds.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::discounts::ActivePeriod;

new_key_type! {
    /// Cart Discount Key
    pub struct CartDiscountKey;
}

/// Item-count and cost bounds for a cart discount, all inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartBounds<'a> {
    /// Minimum number of cart items
    pub min_items: usize,

    /// Maximum number of cart items
    pub max_items: usize,

    /// Minimum cart cost
    pub min_cost: Money<'a, Currency>,

    /// Maximum cart cost
    pub max_cost: Money<'a, Currency>,
}

impl CartBounds<'_> {
    /// Whether a cart with `items` items costing `cost` falls within the bounds.
    pub fn contains(&self, items: usize, cost: &Money<'_, Currency>) -> bool {
        let cost = cost.to_minor_units();

        (self.min_items..=self.max_items).contains(&items)
            && self.min_cost.to_minor_units() <= cost
            && cost <= self.max_cost.to_minor_units()
    }

    /// Whether either bound pair is inverted.
    pub fn is_inverted(&self) -> bool {
        self.min_items > self.max_items
            || self.min_cost.to_minor_units() > self.max_cost.to_minor_units()
    }
}

/// A cart-wide threshold discount.
#[derive(Debug, Clone)]
pub struct CartDiscount<'a> {
    name: String,
    percent: Percentage,
    weight: i32,
    period: ActivePeriod,
    bounds: CartBounds<'a>,
}

impl<'a> CartDiscount<'a> {
    /// Create a new cart discount.
    pub fn new(
        name: impl Into<String>,
        percent: Percentage,
        weight: i32,
        period: ActivePeriod,
        bounds: CartBounds<'a>,
    ) -> Self {
        Self {
            name: name.into(),
            percent,
            weight,
            period,
            bounds,
        }
    }

    /// Discount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Percentage taken off every cart item when applied.
    pub fn percent(&self) -> &Percentage {
        &self.percent
    }

    /// Priority against other cart-level discounts; higher wins.
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Active date range
    pub fn period(&self) -> ActivePeriod {
        self.period
    }

    /// Count and cost bounds
    pub fn bounds(&self) -> &CartBounds<'a> {
        &self.bounds
    }

    /// Whether the discount is active on `date` and the cart is within bounds.
    pub fn is_eligible(&self, items: usize, cost: &Money<'_, Currency>, date: Date) -> bool {
        self.period.contains(date) && self.bounds.contains(items, cost)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::GBP;

    use super::*;

    fn bounds<'a>() -> CartBounds<'a> {
        CartBounds {
            min_items: 2,
            max_items: 5,
            min_cost: Money::from_minor(10_000, GBP),
            max_cost: Money::from_minor(50_000, GBP),
        }
    }

    fn discount<'a>() -> CartDiscount<'a> {
        CartDiscount::new(
            "Big basket",
            Percentage::from(0.05),
            3,
            ActivePeriod::new(date(2024, 1, 1), date(2024, 1, 31)),
            bounds(),
        )
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = bounds();

        assert!(b.contains(2, &Money::from_minor(10_000, GBP)));
        assert!(b.contains(5, &Money::from_minor(50_000, GBP)));
        assert!(!b.contains(1, &Money::from_minor(20_000, GBP)));
        assert!(!b.contains(6, &Money::from_minor(20_000, GBP)));
        assert!(!b.contains(3, &Money::from_minor(9_999, GBP)));
        assert!(!b.contains(3, &Money::from_minor(50_001, GBP)));
    }

    #[test]
    fn inverted_bounds_are_detected() {
        let mut b = bounds();

        assert!(!b.is_inverted());

        b.min_items = 6;

        assert!(b.is_inverted());

        let mut b = bounds();
        b.min_cost = Money::from_minor(60_000, GBP);

        assert!(b.is_inverted());
    }

    #[test]
    fn eligibility_requires_active_period() {
        let d = discount();
        let cost = Money::from_minor(20_000, GBP);

        assert!(d.is_eligible(3, &cost, date(2024, 1, 15)));
        assert!(!d.is_eligible(3, &cost, date(2024, 2, 1)));
    }
}
