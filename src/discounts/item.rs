//! Item Discounts
//!
//! A per-item discount takes a percentage or a fixed amount off a single product, or off every
//! product in a category.

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::{
    discounts::{ActivePeriod, DiscountError, DiscountValue, Scope, apply_percent},
    products::{CategoryKey, ProductKey},
};

new_key_type! {
    /// Item Discount Key
    pub struct ItemDiscountKey;
}

/// A discount on individual products.
#[derive(Debug, Clone)]
pub struct ItemDiscount<'a> {
    name: String,
    scope: Scope,
    value: DiscountValue<'a>,
    weight: i32,
    period: ActivePeriod,
}

impl<'a> ItemDiscount<'a> {
    /// Create a new item discount.
    pub fn new(
        name: impl Into<String>,
        scope: Scope,
        value: DiscountValue<'a>,
        weight: i32,
        period: ActivePeriod,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            value,
            weight,
            period,
        }
    }

    /// Discount name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the discount applies to
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Mechanism and value
    pub fn value(&self) -> &DiscountValue<'a> {
        &self.value
    }

    /// Declared priority. Per-item resolution ignores it; the lower price wins.
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Active date range
    pub fn period(&self) -> ActivePeriod {
        self.period
    }

    /// Whether the discount is active on `date` and covers the product.
    pub fn applies_to(&self, product: ProductKey, category: CategoryKey, date: Date) -> bool {
        self.period.contains(date) && self.scope.matches(product, category)
    }

    /// Price after applying this discount alone, without any floor.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage calculation overflows or the amount is in a
    /// different currency.
    pub fn discounted_price(
        &self,
        price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match &self.value {
            DiscountValue::Percent(percent) => apply_percent(percent, price),
            DiscountValue::AmountOff(amount) => Ok(price.sub(*amount)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::civil::date;
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    fn march() -> ActivePeriod {
        ActivePeriod::new(date(2024, 3, 1), date(2024, 3, 31))
    }

    #[test]
    fn applies_to_matching_category_in_period() {
        let mut categories = SlotMap::<CategoryKey, ()>::with_key();
        let phones = categories.insert(());
        let cases = categories.insert(());

        let discount = ItemDiscount::new(
            "Phones 10%",
            Scope::Category(phones),
            DiscountValue::Percent(Percentage::from(0.1)),
            0,
            march(),
        );

        let product = ProductKey::default();

        assert!(discount.applies_to(product, phones, date(2024, 3, 15)));
        assert!(!discount.applies_to(product, cases, date(2024, 3, 15)));
        assert!(!discount.applies_to(product, phones, date(2024, 4, 1)));
    }

    #[test]
    fn discounted_price_percent() -> TestResult {
        let discount = ItemDiscount::new(
            "20% off",
            Scope::Product(ProductKey::default()),
            DiscountValue::Percent(Percentage::from(0.2)),
            0,
            march(),
        );

        let price = discount.discounted_price(&Money::from_minor(10_000, GBP))?;

        assert_eq!(price, Money::from_minor(8_000, GBP));

        Ok(())
    }

    #[test]
    fn discounted_price_amount_off_can_go_negative() -> TestResult {
        let discount = ItemDiscount::new(
            "£60 off",
            Scope::Product(ProductKey::default()),
            DiscountValue::AmountOff(Money::from_minor(6_000, GBP)),
            0,
            march(),
        );

        let price = discount.discounted_price(&Money::from_minor(5_000, GBP))?;

        assert_eq!(price, Money::from_minor(-1_000, GBP));

        Ok(())
    }

    #[test]
    fn accessors_return_constructor_values() {
        let product = ProductKey::default();
        let discount = ItemDiscount::new(
            "Spring",
            Scope::Product(product),
            DiscountValue::Percent(Percentage::from(0.1)),
            7,
            march(),
        );

        assert_eq!(discount.name(), "Spring");
        assert_eq!(discount.scope(), Scope::Product(product));
        assert_eq!(discount.weight(), 7);
        assert_eq!(discount.period(), march());
    }
}
