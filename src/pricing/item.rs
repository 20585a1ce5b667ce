//! Per-item price resolution.
//!
//! Every active item discount covering the product (directly or through its category) is a
//! candidate. The largest percentage and the largest fixed amount are each applied to the
//! reference price and the lower result wins; declared weights play no part here. A fixed
//! amount that would take the price to zero or below is clamped to the floor price.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    discounts::{DiscountValue, apply_percent, item::ItemDiscountKey, percent_ratio},
    pricing::{PriceResolver, PricingError},
    products::ProductKey,
};

/// The discount that produced an item's final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedItemDiscount {
    /// Winning discount
    pub key: ItemDiscountKey,

    /// Whether the price was raised to the floor.
    pub floored: bool,
}

/// Outcome of resolving one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemResolution<'a> {
    /// Reference price the discounts were taken from
    pub original: Money<'a, Currency>,

    /// Final price
    pub price: Money<'a, Currency>,

    /// Winning discount, if any applied
    pub applied: Option<AppliedItemDiscount>,
}

impl ItemResolution<'_> {
    /// Whether the final price is below the reference price.
    pub fn is_discounted(&self) -> bool {
        self.price.to_minor_units() < self.original.to_minor_units()
    }
}

impl<'a> PriceResolver<'_, 'a> {
    /// Resolve a product's price, reporting which discount won.
    ///
    /// Without an `old_price` the product's most expensive offer is used as the reference.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if:
    /// - the product is not in the catalog (`PricingError::UnknownProduct`).
    /// - no price was given and the product has no offers (`PricingError::NotFound`).
    /// - the price is in a different currency from the discounts (`PricingError::CurrencyMismatch`).
    /// - discount arithmetic fails (`PricingError::Discount` / `PricingError::Money`).
    #[tracing::instrument(level = "debug", skip(self, old_price), fields(date = %self.date))]
    pub fn resolve_item(
        &self,
        product: ProductKey,
        old_price: Option<Money<'a, Currency>>,
    ) -> Result<ItemResolution<'a>, PricingError> {
        let category = self.category_of(product)?;

        let original = match old_price {
            Some(price) => price,
            None => self
                .catalog
                .reference_price(product)
                .ok_or(PricingError::NotFound(product))?,
        };

        self.check_currency(original.currency())?;

        let mut best_percent: Option<(ItemDiscountKey, &Percentage)> = None;
        let mut best_amount: Option<(ItemDiscountKey, &Money<'a, Currency>)> = None;

        for (key, discount) in self.discounts.items() {
            if !discount.applies_to(product, category, self.date) {
                continue;
            }

            match discount.value() {
                DiscountValue::Percent(percent) => {
                    if best_percent
                        .is_none_or(|(_, best)| percent_ratio(percent) > percent_ratio(best))
                    {
                        best_percent = Some((key, percent));
                    }
                }
                DiscountValue::AmountOff(amount) => {
                    if best_amount
                        .is_none_or(|(_, best)| amount.to_minor_units() > best.to_minor_units())
                    {
                        best_amount = Some((key, amount));
                    }
                }
            }
        }

        let percent_price = match best_percent {
            Some((key, percent)) => Some((key, apply_percent(percent, &original)?)),
            None => None,
        };

        let amount_price = match best_amount {
            Some((key, amount)) => Some((key, original.sub(*amount)?)),
            None => None,
        };

        let (price, applied) = match (percent_price, amount_price) {
            (_, Some((key, price))) if price.to_minor_units() <= 0 => (
                self.floor(original.currency()),
                Some(AppliedItemDiscount { key, floored: true }),
            ),
            (Some(percent), Some(amount)) => {
                let (key, price) = if amount.1.to_minor_units() < percent.1.to_minor_units() {
                    amount
                } else {
                    percent
                };

                (
                    price,
                    Some(AppliedItemDiscount {
                        key,
                        floored: false,
                    }),
                )
            }
            (Some((key, price)), None) | (None, Some((key, price))) => (
                price,
                Some(AppliedItemDiscount {
                    key,
                    floored: false,
                }),
            ),
            (None, None) => (original, None),
        };

        debug!(
            original = %original,
            price = %price,
            discounted = applied.is_some(),
            "resolved item price"
        );

        Ok(ItemResolution {
            original,
            price,
            applied,
        })
    }

    /// Resolve a product's final price.
    ///
    /// # Errors
    ///
    /// See [`PriceResolver::resolve_item`].
    pub fn resolve_item_price(
        &self,
        product: ProductKey,
        old_price: Option<Money<'a, Currency>>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.resolve_item(product, old_price)?.price)
    }
}
