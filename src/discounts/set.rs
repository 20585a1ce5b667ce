//! Set Discounts
//!
//! A set discount rewards buying two things together: each of its two slots is a product or a
//! category, and the discount is available when different cart products fill both slots.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use slotmap::new_key_type;

use crate::{
    discounts::{ActivePeriod, Scope},
    products::{CategoryKey, ProductKey},
};

new_key_type! {
    /// Set Discount Key
    pub struct SetDiscountKey;
}

/// A paired-item discount.
#[derive(Debug, Clone)]
pub struct SetDiscount {
    name: String,
    slots: [Scope; 2],
    percent: Percentage,
    weight: i32,
    period: ActivePeriod,
}

impl SetDiscount {
    /// Create a new set discount.
    pub fn new(
        name: impl Into<String>,
        slots: [Scope; 2],
        percent: Percentage,
        weight: i32,
        period: ActivePeriod,
    ) -> Self {
        Self {
            name: name.into(),
            slots,
            percent,
            weight,
            period,
        }
    }

    /// Discount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The two scopes that must both be filled.
    pub fn slots(&self) -> &[Scope; 2] {
        &self.slots
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

    /// Whether the discount is active on `date` and the products fill both slots.
    ///
    /// A single product cannot fill both slots.
    pub fn is_satisfied_by(&self, products: &[(ProductKey, CategoryKey)], date: Date) -> bool {
        if !self.period.contains(date) {
            return false;
        }

        let [first, second] = &self.slots;

        products.iter().any(|&(a, a_category)| {
            first.matches(a, a_category)
                && products
                    .iter()
                    .any(|&(b, b_category)| b != a && second.matches(b, b_category))
        })
    }
}
