//! Discounts
//!
//! Discount records and the arithmetic shared by every discount type. Records are read-only
//! input to the price resolver; they are validated once, when added to a
//! [`DiscountBook`](book::DiscountBook).

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::products::{CategoryKey, ProductKey};

pub mod book;
pub mod cart;
pub mod item;
pub mod set;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// What a discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A single product.
    Product(ProductKey),

    /// Every product in a category.
    Category(CategoryKey),
}

impl Scope {
    /// Whether a product (listed under `category`) falls within this scope.
    pub fn matches(&self, product: ProductKey, category: CategoryKey) -> bool {
        match self {
            Scope::Product(key) => *key == product,
            Scope::Category(key) => *key == category,
        }
    }
}

/// Inclusive date range during which a discount is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePeriod {
    start: Date,
    end: Date,
}

impl ActivePeriod {
    /// Create a new period. Ranges are checked when the discount is added to a book.
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// First active day.
    pub fn start(&self) -> Date {
        self.start
    }

    /// Last active day.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls within `[start, end]`.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the range is inverted.
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

/// Discount mechanism and value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DiscountValue<'a> {
    /// Take a percentage off the price (e.g., "20% off")
    Percent(Percentage),

    /// Subtract a fixed amount from the price (e.g., "£5 off")
    AmountOff(Money<'a, Currency>),
}

/// Project a percentage onto its decimal ratio (0.25 for 25%).
pub fn percent_ratio(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    (*percent) * Decimal::ONE
}

/// Price remaining after taking `percent` off `price`, rounded to the nearest minor unit.
///
/// The remainder is rounded, not the discount, so `price * (1 - percent)` is what the customer
/// pays.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn apply_percent<'a>(
    percent: &Percentage,
    price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor =
        Decimal::from_i64(price.to_minor_units()).ok_or(DiscountError::PercentConversion)?;

    let remaining = Decimal::ONE
        .checked_sub(percent_ratio(percent))
        .ok_or(DiscountError::PercentConversion)?;

    let discounted = minor
        .checked_mul(remaining)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)?;

    Ok(Money::from_minor(discounted, price.currency()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn apply_percent_rounds_the_remaining_price() -> TestResult {
        // 333 * 0.85 = 283.05
        let price = apply_percent(&Percentage::from(0.15), &Money::from_minor(333, GBP))?;

        assert_eq!(price, Money::from_minor(283, GBP));

        // 5 * 0.5 = 2.5, rounded away from zero
        let price = apply_percent(&Percentage::from(0.5), &Money::from_minor(5, GBP))?;

        assert_eq!(price, Money::from_minor(3, GBP));

        Ok(())
    }

    #[test]
    fn apply_percent_zero_is_identity() -> TestResult {
        let price = apply_percent(&Percentage::from(0.0), &Money::from_minor(1234, GBP))?;

        assert_eq!(price, Money::from_minor(1234, GBP));

        Ok(())
    }

    #[test]
    fn period_is_inclusive() {
        let period = ActivePeriod::new(date(2024, 3, 1), date(2024, 3, 31));

        assert!(period.contains(date(2024, 3, 1)));
        assert!(period.contains(date(2024, 3, 31)));
        assert!(!period.contains(date(2024, 2, 29)));
        assert!(!period.contains(date(2024, 4, 1)));
        assert!(!period.is_inverted());
    }

    #[test]
    fn single_day_period_is_valid() {
        let period = ActivePeriod::new(date(2024, 3, 1), date(2024, 3, 1));

        assert!(period.contains(date(2024, 3, 1)));
        assert!(!period.is_inverted());
    }

    #[test]
    fn scope_matches_product_or_category() {
        let product = ProductKey::default();
        let category = CategoryKey::default();

        assert!(Scope::Product(product).matches(product, category));
        assert!(Scope::Category(category).matches(product, category));
    }
}
