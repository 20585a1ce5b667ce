//! Pricing
//!
//! The price resolver turns a product (optionally with a known price) or a whole cart into
//! final prices, choosing which discounts apply. It is a pure function of the catalog
//! snapshot, the discount book and the evaluation date: no clock reads, no writes, no shared
//! mutable state, so one resolver may be shared freely across threads.

use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    discounts::{DiscountError, book::DiscountBook},
    offers::MarketOffer,
    products::{CategoryKey, ProductKey},
};

pub mod cart;
pub mod item;

/// Errors raised while resolving prices.
#[derive(Debug, Error)]
pub enum PricingError {
    /// No price was supplied and the product has no offers to take one from.
    #[error("no reference price: product has no offers")]
    NotFound(ProductKey),

    /// The product is not in the catalog.
    #[error("unknown product")]
    UnknownProduct(ProductKey),

    /// A price is in a different currency from the catalog and discounts (price currency,
    /// discount book currency).
    #[error("Price has currency {0}, but discounts have currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Strict mode requires a cart-level discount, but none is eligible.
    #[error("no cart-level discount is eligible for this cart")]
    AmbiguousDiscount,

    /// Discount arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// What to do when no cart-level discount is eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CartDiscountPolicy {
    /// Price every item on its own.
    #[default]
    Fallback,

    /// Fail with [`PricingError::AmbiguousDiscount`].
    Strict,
}

/// Resolver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Lowest price an amount-off discount may produce, in minor units. `None` is one major
    /// unit of the price's currency.
    pub floor_minor: Option<i64>,

    /// Behaviour when no cart-level discount is eligible.
    pub cart_policy: CartDiscountPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            floor_minor: None,
            cart_policy: CartDiscountPolicy::default(),
        }
    }
}

/// Price Resolver
#[derive(Debug, Clone, Copy)]
pub struct PriceResolver<'c, 'a> {
    catalog: &'c Catalog<'a>,
    discounts: &'c DiscountBook<'a>,
    date: Date,
    config: ResolverConfig,
}

impl<'c, 'a> PriceResolver<'c, 'a> {
    /// Create a resolver evaluating discounts as of `date`.
    pub fn new(catalog: &'c Catalog<'a>, discounts: &'c DiscountBook<'a>, date: Date) -> Self {
        Self {
            catalog,
            discounts,
            date,
            config: ResolverConfig::default(),
        }
    }

    /// Replace the resolver settings.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluation date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Resolver settings.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Catalog snapshot the resolver reads from.
    pub fn catalog(&self) -> &'c Catalog<'a> {
        self.catalog
    }

    /// Discounts the resolver chooses from.
    pub fn discounts(&self) -> &'c DiscountBook<'a> {
        self.discounts
    }

    fn category_of(&self, product: ProductKey) -> Result<CategoryKey, PricingError> {
        self.catalog
            .product(product)
            .map(|p| p.category)
            .ok_or(PricingError::UnknownProduct(product))
    }

    fn floor(&self, currency: &'a Currency) -> Money<'a, Currency> {
        let minor = self
            .config
            .floor_minor
            .unwrap_or_else(|| one_major_unit(currency));

        Money::from_minor(minor, currency)
    }

    fn check_currency(&self, currency: &Currency) -> Result<(), PricingError> {
        let expected = self.discounts.currency();

        if currency != expected {
            return Err(PricingError::CurrencyMismatch(
                currency.iso_alpha_code,
                expected.iso_alpha_code,
            ));
        }

        Ok(())
    }
}

/// Minor units in one major unit of `currency`: 100 for GBP, 1 for JPY.
pub fn one_major_unit(currency: &Currency) -> i64 {
    10_i64.checked_pow(currency.exponent).unwrap_or(i64::MAX)
}

/// Anything that can be priced by a [`PriceResolver`].
pub trait Priceable<'a> {
    /// Resolve the final price.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if no price can be determined.
    fn resolve_price(
        &self,
        resolver: &PriceResolver<'_, 'a>,
    ) -> Result<Money<'a, Currency>, PricingError>;
}

/// A product is priced from its most expensive offer.
impl<'a> Priceable<'a> for ProductKey {
    fn resolve_price(
        &self,
        resolver: &PriceResolver<'_, 'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        resolver.resolve_item_price(*self, None)
    }
}

/// An offer is priced from the seller's own price.
impl<'a> Priceable<'a> for MarketOffer<'a> {
    fn resolve_price(
        &self,
        resolver: &PriceResolver<'_, 'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        resolver.resolve_item_price(self.product, Some(self.price))
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::civil::date;
    use rusty_money::iso::{BHD, GBP, JPY};
    use smallvec::SmallVec;
    use testresult::TestResult;

    use crate::{
        discounts::{ActivePeriod, DiscountValue, Scope, item::ItemDiscount},
        offers::Seller,
        products::{Category, Product},
    };

    use super::*;

    #[test]
    fn priceable_product_and_offer() -> TestResult {
        let mut catalog = Catalog::new(GBP);
        let category = catalog.add_category(Category {
            name: "Phones".to_string(),
            active: true,
        });
        let phone = catalog.add_product(Product {
            name: "Phone".to_string(),
            category,
            features: SmallVec::new(),
            added_on: date(2024, 1, 1),
        })?;
        let seller = catalog.add_seller(Seller {
            title: "Acme".to_string(),
        });

        let cheap = MarketOffer::new(phone, seller, Money::from_minor(8_000, GBP));

        catalog.add_offer(cheap.clone())?;
        catalog.add_offer(MarketOffer::new(
            phone,
            seller,
            Money::from_minor(10_000, GBP),
        ))?;

        let mut discounts = DiscountBook::new(GBP);
        discounts.add_item(ItemDiscount::new(
            "10% off phones",
            Scope::Category(category),
            DiscountValue::Percent(Percentage::from(0.1)),
            0,
            ActivePeriod::new(date(2024, 1, 1), date(2024, 12, 31)),
        ))?;

        let resolver = PriceResolver::new(&catalog, &discounts, date(2024, 6, 1));

        assert_eq!(
            phone.resolve_price(&resolver)?,
            Money::from_minor(9_000, GBP)
        );
        assert_eq!(
            cheap.resolve_price(&resolver)?,
            Money::from_minor(7_200, GBP)
        );

        Ok(())
    }

    #[test]
    fn default_config_uses_one_unit_floor_and_fallback() {
        let config = ResolverConfig::default();

        assert_eq!(config.floor_minor, None);
        assert_eq!(config.cart_policy, CartDiscountPolicy::Fallback);
    }

    #[test]
    fn one_major_unit_follows_currency_exponent() {
        assert_eq!(one_major_unit(GBP), 100);
        assert_eq!(one_major_unit(JPY), 1);
        assert_eq!(one_major_unit(BHD), 1_000);
    }
}
