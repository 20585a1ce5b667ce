//! Discount Book
//!
//! The set of discount records the resolver chooses from. Records are validated on the way in,
//! so the resolver never has to re-check ranges.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::discounts::{
    ActivePeriod, DiscountValue, percent_ratio,
    cart::{CartDiscount, CartDiscountKey},
    item::{ItemDiscount, ItemDiscountKey},
    set::{SetDiscount, SetDiscountKey},
};

/// Errors raised when a discount record is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountValidationError {
    /// The active period ends before it starts, or count/cost bounds are inverted.
    #[error("discount {0:?} has an inverted range")]
    InvalidRange(String),

    /// Percent value outside `0%..=100%`.
    #[error("discount {0:?} has a percentage outside 0-100%")]
    PercentOutOfRange(String),

    /// Negative fixed amount.
    #[error("discount {0:?} has a negative amount")]
    NegativeAmount(String),

    /// Amount currency differs from the book currency (discount, amount currency, book currency).
    #[error("discount {0:?} has currency {1}, but book has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Discount Book
#[derive(Debug)]
pub struct DiscountBook<'a> {
    items: SlotMap<ItemDiscountKey, ItemDiscount<'a>>,
    sets: SlotMap<SetDiscountKey, SetDiscount>,
    carts: SlotMap<CartDiscountKey, CartDiscount<'a>>,
    currency: &'static Currency,
}

impl<'a> DiscountBook<'a> {
    /// Create an empty book for discounts in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: SlotMap::with_key(),
            sets: SlotMap::with_key(),
            carts: SlotMap::with_key(),
            currency,
        }
    }

    /// Book currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Add a per-item discount.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountValidationError`] if the period is inverted, the percentage is out of
    /// range, or the amount is negative or in the wrong currency.
    pub fn add_item(
        &mut self,
        discount: ItemDiscount<'a>,
    ) -> Result<ItemDiscountKey, DiscountValidationError> {
        check_period(discount.name(), discount.period())?;

        match discount.value() {
            DiscountValue::Percent(percent) => {
                check_percent(discount.name(), percent_ratio(percent))?;
            }
            DiscountValue::AmountOff(amount) => {
                self.check_money(discount.name(), amount)?;

                if amount.to_minor_units() < 0 {
                    return Err(DiscountValidationError::NegativeAmount(
                        discount.name().to_string(),
                    ));
                }
            }
        }

        Ok(self.items.insert(discount))
    }

    /// Add a set discount.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountValidationError`] if the period is inverted or the percentage is out
    /// of range.
    pub fn add_set(
        &mut self,
        discount: SetDiscount,
    ) -> Result<SetDiscountKey, DiscountValidationError> {
        check_period(discount.name(), discount.period())?;
        check_percent(discount.name(), percent_ratio(discount.percent()))?;

        Ok(self.sets.insert(discount))
    }

    /// Add a cart-wide threshold discount.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountValidationError`] if the period or bounds are inverted, the
    /// percentage is out of range, or the cost bounds are in the wrong currency.
    pub fn add_cart(
        &mut self,
        discount: CartDiscount<'a>,
    ) -> Result<CartDiscountKey, DiscountValidationError> {
        check_period(discount.name(), discount.period())?;
        check_percent(discount.name(), percent_ratio(discount.percent()))?;

        let bounds = discount.bounds();

        self.check_money(discount.name(), &bounds.min_cost)?;
        self.check_money(discount.name(), &bounds.max_cost)?;

        if bounds.is_inverted() {
            return Err(DiscountValidationError::InvalidRange(
                discount.name().to_string(),
            ));
        }

        Ok(self.carts.insert(discount))
    }

    /// Iterate over per-item discounts, in the order they were added.
    pub fn items(&self) -> impl Iterator<Item = (ItemDiscountKey, &ItemDiscount<'a>)> {
        self.items.iter()
    }

    /// Iterate over set discounts, in the order they were added.
    pub fn sets(&self) -> impl Iterator<Item = (SetDiscountKey, &SetDiscount)> {
        self.sets.iter()
    }

    /// Iterate over cart discounts, in the order they were added.
    pub fn carts(&self) -> impl Iterator<Item = (CartDiscountKey, &CartDiscount<'a>)> {
        self.carts.iter()
    }

    /// Get a per-item discount.
    pub fn item(&self, key: ItemDiscountKey) -> Option<&ItemDiscount<'a>> {
        self.items.get(key)
    }

    /// Get a set discount.
    pub fn set(&self, key: SetDiscountKey) -> Option<&SetDiscount> {
        self.sets.get(key)
    }

    /// Get a cart discount.
    pub fn cart(&self, key: CartDiscountKey) -> Option<&CartDiscount<'a>> {
        self.carts.get(key)
    }

    /// Total number of records across all discount types.
    pub fn len(&self) -> usize {
        self.items.len() + self.sets.len() + self.carts.len()
    }

    /// Whether the book holds no discounts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_money(
        &self,
        name: &str,
        money: &Money<'_, Currency>,
    ) -> Result<(), DiscountValidationError> {
        let currency = money.currency();

        if currency == self.currency {
            Ok(())
        } else {
            Err(DiscountValidationError::CurrencyMismatch(
                name.to_string(),
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

fn check_period(name: &str, period: ActivePeriod) -> Result<(), DiscountValidationError> {
    if period.is_inverted() {
        Err(DiscountValidationError::InvalidRange(name.to_string()))
    } else {
        Ok(())
    }
}

fn check_percent(name: &str, ratio: Decimal) -> Result<(), DiscountValidationError> {
    if (Decimal::ZERO..=Decimal::ONE).contains(&ratio) {
        Ok(())
    } else {
        Err(DiscountValidationError::PercentOutOfRange(name.to_string()))
    }
}
