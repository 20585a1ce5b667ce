//! Cart price resolution.
//!
//! A cart is first checked against cart-level discounts: threshold discounts bounded by item
//! count and total cost, and set discounts matched by pairs of cart products. The eligible one
//! with the highest weight takes its percentage off every line. When neither kind is eligible,
//! each line is priced on its own.

use std::cmp::Reverse;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    cart::Cart,
    discounts::{
        apply_percent, cart::CartDiscountKey, item::ItemDiscountKey, set::SetDiscountKey,
    },
    pricing::{CartDiscountPolicy, PriceResolver, PricingError},
    products::{CategoryKey, ProductKey},
};

/// Which rule priced the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartDiscountApplied {
    /// A threshold discount was applied to every line.
    Threshold(CartDiscountKey),

    /// A set discount was applied to every line.
    Set(SetDiscountKey),

    /// No cart-level discount was eligible; lines were priced individually.
    PerItem,
}

/// Resolved price for one cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineResolution<'a> {
    /// Price the product was listed at in the cart
    pub original: Money<'a, Currency>,

    /// Final price
    pub price: Money<'a, Currency>,

    /// Whether a discount applied to this line
    pub discount_applied: bool,

    /// Item discount that priced this line, when lines were priced individually
    pub item_discount: Option<ItemDiscountKey>,
}

/// Outcome of resolving a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartResolution<'a> {
    lines: Vec<(ProductKey, LineResolution<'a>)>,
    applied: CartDiscountApplied,
    currency: &'static Currency,
}

impl<'a> CartResolution<'a> {
    /// Resolution for a product.
    pub fn get(&self, product: ProductKey) -> Option<&LineResolution<'a>> {
        self.lines
            .iter()
            .find(|(key, _)| *key == product)
            .map(|(_, line)| line)
    }

    /// Iterate over lines in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &(ProductKey, LineResolution<'a>)> {
        self.lines.iter()
    }

    /// Iterate over the resolved products.
    pub fn products(&self) -> impl Iterator<Item = ProductKey> + '_ {
        self.lines.iter().map(|(product, _)| *product)
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart was empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Rule that priced the cart.
    pub fn applied(&self) -> CartDiscountApplied {
        self.applied
    }

    /// Currency of every line.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of the listed prices.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.sum(|line| line.original)
    }

    /// Sum of the final prices.
    pub fn total(&self) -> Money<'a, Currency> {
        self.sum(|line| line.price)
    }

    /// Difference between subtotal and total.
    pub fn savings(&self) -> Money<'a, Currency> {
        let minor = self.subtotal().to_minor_units() - self.total().to_minor_units();

        Money::from_minor(minor, self.currency)
    }

    fn sum(&self, pick: impl Fn(&LineResolution<'a>) -> Money<'a, Currency>) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .map(|(_, line)| pick(line).to_minor_units())
            .sum::<i64>();

        Money::from_minor(minor, self.currency)
    }
}

impl<'a> PriceResolver<'_, 'a> {
    /// Resolve every line of a cart.
    ///
    /// The result holds exactly the cart's products, in cart order.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if:
    /// - the cart is in a different currency from the discounts (`PricingError::CurrencyMismatch`).
    /// - a cart product is not in the catalog (`PricingError::UnknownProduct`).
    /// - the resolver is strict and no cart-level discount is eligible
    ///   (`PricingError::AmbiguousDiscount`).
    /// - discount arithmetic fails.
    #[tracing::instrument(level = "debug", skip_all, fields(items = cart.len(), date = %self.date))]
    pub fn resolve_cart(&self, cart: &Cart<'a>) -> Result<CartResolution<'a>, PricingError> {
        self.check_currency(cart.currency())?;

        let products = cart
            .products()
            .map(|product| self.category_of(product).map(|category| (product, category)))
            .collect::<Result<Vec<(ProductKey, CategoryKey)>, PricingError>>()?;

        let subtotal = cart.subtotal();

        let threshold = self
            .discounts
            .carts()
            .filter(|(_, discount)| discount.is_eligible(cart.len(), &subtotal, self.date))
            .min_by_key(|(_, discount)| Reverse(discount.weight()));

        let set = self
            .discounts
            .sets()
            .filter(|(_, discount)| discount.is_satisfied_by(&products, self.date))
            .min_by_key(|(_, discount)| Reverse(discount.weight()));

        let chosen: Option<(CartDiscountApplied, &Percentage)> = match (threshold, set) {
            (Some((tk, t)), Some((sk, s))) => {
                if s.weight() > t.weight() {
                    Some((CartDiscountApplied::Set(sk), s.percent()))
                } else {
                    Some((CartDiscountApplied::Threshold(tk), t.percent()))
                }
            }
            (Some((tk, t)), None) => Some((CartDiscountApplied::Threshold(tk), t.percent())),
            (None, Some((sk, s))) => Some((CartDiscountApplied::Set(sk), s.percent())),
            (None, None) => None,
        };

        let resolution = match chosen {
            Some((applied, percent)) => {
                debug!(?applied, "applying cart-level discount");

                self.apply_uniformly(cart, applied, percent)?
            }
            None if self.config.cart_policy == CartDiscountPolicy::Strict => {
                return Err(PricingError::AmbiguousDiscount);
            }
            None => {
                debug!("no cart-level discount eligible, pricing items individually");

                self.resolve_lines(cart)?
            }
        };

        debug!(
            subtotal = %resolution.subtotal(),
            total = %resolution.total(),
            "resolved cart"
        );

        Ok(resolution)
    }

    fn apply_uniformly(
        &self,
        cart: &Cart<'a>,
        applied: CartDiscountApplied,
        percent: &Percentage,
    ) -> Result<CartResolution<'a>, PricingError> {
        let lines = cart
            .iter()
            .map(|&(product, original)| -> Result<_, PricingError> {
                let price = apply_percent(percent, &original)?;

                Ok((
                    product,
                    LineResolution {
                        original,
                        price,
                        discount_applied: true,
                        item_discount: None,
                    },
                ))
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(CartResolution {
            lines,
            applied,
            currency: cart.currency(),
        })
    }

    fn resolve_lines(&self, cart: &Cart<'a>) -> Result<CartResolution<'a>, PricingError> {
        let lines = cart
            .iter()
            .map(|&(product, original)| -> Result<_, PricingError> {
                let item = self.resolve_item(product, Some(original))?;

                Ok((
                    product,
                    LineResolution {
                        original,
                        price: item.price,
                        discount_applied: item.is_discounted(),
                        item_discount: item.applied.map(|applied| applied.key),
                    },
                ))
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(CartResolution {
            lines,
            applied: CartDiscountApplied::PerItem,
            currency: cart.currency(),
        })
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::civil::{Date, date};
    use rusty_money::iso::GBP;
    use smallvec::SmallVec;
    use testresult::TestResult;

    use crate::{
        catalog::Catalog,
        discounts::{
            ActivePeriod, DiscountValue, Scope,
            book::DiscountBook,
            cart::{CartBounds, CartDiscount},
            item::ItemDiscount,
            set::SetDiscount,
        },
        pricing::ResolverConfig,
        products::{Category, Product},
    };

    use super::*;

    struct Fixture<'a> {
        catalog: Catalog<'a>,
        discounts: DiscountBook<'a>,
        phones: CategoryKey,
        accessories: CategoryKey,
        a: ProductKey,
        b: ProductKey,
    }

    fn fixture<'a>() -> TestResult<Fixture<'a>> {
        let mut catalog = Catalog::new(GBP);

        let phones = catalog.add_category(Category {
            name: "Phones".to_string(),
            active: true,
        });
        let accessories = catalog.add_category(Category {
            name: "Accessories".to_string(),
            active: true,
        });

        let a = catalog.add_product(product("Phone", phones))?;
        let b = catalog.add_product(product("Case", accessories))?;

        Ok(Fixture {
            catalog,
            discounts: DiscountBook::new(GBP),
            phones,
            accessories,
            a,
            b,
        })
    }

    fn product(name: &str, category: CategoryKey) -> Product {
        Product {
            name: name.to_string(),
            category,
            features: SmallVec::new(),
            added_on: date(2024, 1, 1),
        }
    }

    fn period() -> ActivePeriod {
        ActivePeriod::new(date(2024, 1, 1), date(2024, 12, 31))
    }

    fn today() -> Date {
        date(2024, 6, 1)
    }

    fn cart<'a>(f: &Fixture<'a>) -> TestResult<Cart<'a>> {
        Ok(Cart::with_lines(
            [
                (f.a, Money::from_minor(10_000, GBP)),
                (f.b, Money::from_minor(20_000, GBP)),
            ],
            GBP,
        )?)
    }

    fn threshold<'a>(weight: i32, ratio: f64) -> CartDiscount<'a> {
        CartDiscount::new(
            "threshold",
            Percentage::from(ratio),
            weight,
            period(),
            CartBounds {
                min_items: 1,
                max_items: 10,
                min_cost: Money::from_minor(0, GBP),
                max_cost: Money::from_minor(100_000, GBP),
            },
        )
    }

    fn set(f: &Fixture<'_>, weight: i32, ratio: f64) -> SetDiscount {
        SetDiscount::new(
            "set",
            [Scope::Category(f.phones), Scope::Category(f.accessories)],
            Percentage::from(ratio),
            weight,
            period(),
        )
    }

    #[test]
    fn falls_back_to_per_item_pricing() -> TestResult {
        let mut f = fixture()?;

        let ten_off = f.discounts.add_item(ItemDiscount::new(
            "10% off A",
            Scope::Product(f.a),
            DiscountValue::Percent(Percentage::from(0.1)),
            0,
            period(),
        ))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::PerItem);
        assert_eq!(
            resolution.get(f.a),
            Some(&LineResolution {
                original: Money::from_minor(10_000, GBP),
                price: Money::from_minor(9_000, GBP),
                discount_applied: true,
                item_discount: Some(ten_off),
            })
        );
        assert_eq!(
            resolution.get(f.b),
            Some(&LineResolution {
                original: Money::from_minor(20_000, GBP),
                price: Money::from_minor(20_000, GBP),
                discount_applied: false,
                item_discount: None,
            })
        );
        assert_eq!(resolution.subtotal(), Money::from_minor(30_000, GBP));
        assert_eq!(resolution.total(), Money::from_minor(29_000, GBP));
        assert_eq!(resolution.savings(), Money::from_minor(1_000, GBP));

        Ok(())
    }

    #[test]
    fn per_item_lines_match_item_resolution() -> TestResult {
        let mut f = fixture()?;

        f.discounts.add_item(ItemDiscount::new(
            "5 off accessories",
            Scope::Category(f.accessories),
            DiscountValue::AmountOff(Money::from_minor(500, GBP)),
            0,
            period(),
        ))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let cart = cart(&f)?;
        let resolution = resolver.resolve_cart(&cart)?;

        for &(product, price) in cart.iter() {
            let expected = resolver.resolve_item_price(product, Some(price))?;

            assert_eq!(resolution.get(product).map(|line| line.price), Some(expected));
        }

        Ok(())
    }

    #[test]
    fn threshold_discount_applies_to_every_line() -> TestResult {
        let mut f = fixture()?;

        let key = f.discounts.add_cart(threshold(1, 0.1))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::Threshold(key));
        assert!(resolution.iter().all(|(_, line)| line.discount_applied));
        assert_eq!(resolution.total(), Money::from_minor(27_000, GBP));

        Ok(())
    }

    #[test]
    fn threshold_outside_bounds_is_ignored() -> TestResult {
        let mut f = fixture()?;

        f.discounts.add_cart(CartDiscount::new(
            "big carts only",
            Percentage::from(0.1),
            1,
            period(),
            CartBounds {
                min_items: 3,
                max_items: 10,
                min_cost: Money::from_minor(0, GBP),
                max_cost: Money::from_minor(100_000, GBP),
            },
        ))?;
        f.discounts.add_cart(CartDiscount::new(
            "small spend only",
            Percentage::from(0.1),
            1,
            period(),
            CartBounds {
                min_items: 1,
                max_items: 10,
                min_cost: Money::from_minor(0, GBP),
                max_cost: Money::from_minor(29_999, GBP),
            },
        ))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::PerItem);
        assert_eq!(resolution.total(), Money::from_minor(30_000, GBP));

        Ok(())
    }

    #[test]
    fn highest_weight_threshold_wins() -> TestResult {
        let mut f = fixture()?;

        f.discounts.add_cart(threshold(1, 0.5))?;
        let heavy = f.discounts.add_cart(threshold(5, 0.1))?;
        f.discounts.add_cart(threshold(5, 0.2))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::Threshold(heavy));
        assert_eq!(resolution.total(), Money::from_minor(27_000, GBP));

        Ok(())
    }

    #[test]
    fn heavier_set_beats_threshold() -> TestResult {
        let mut f = fixture()?;

        f.discounts.add_cart(threshold(1, 0.1))?;
        let pair = set(&f, 2, 0.25);
        let key = f.discounts.add_set(pair)?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::Set(key));
        assert_eq!(
            resolution.get(f.a).map(|line| line.price),
            Some(Money::from_minor(7_500, GBP))
        );
        assert_eq!(
            resolution.get(f.b).map(|line| line.price),
            Some(Money::from_minor(15_000, GBP))
        );

        Ok(())
    }

    #[test]
    fn threshold_wins_weight_tie_with_set() -> TestResult {
        let mut f = fixture()?;

        let key = f.discounts.add_cart(threshold(3, 0.1))?;
        let pair = set(&f, 3, 0.25);
        f.discounts.add_set(pair)?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let resolution = resolver.resolve_cart(&cart(&f)?)?;

        assert_eq!(resolution.applied(), CartDiscountApplied::Threshold(key));

        Ok(())
    }

    #[test]
    fn set_alone_applies_when_both_slots_filled() -> TestResult {
        let mut f = fixture()?;

        let pair = set(&f, 0, 0.1);
        let key = f.discounts.add_set(pair)?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());

        let full = resolver.resolve_cart(&cart(&f)?)?;
        let half = resolver.resolve_cart(&cart(&f)?.without_product(f.b)?)?;

        assert_eq!(full.applied(), CartDiscountApplied::Set(key));
        assert_eq!(half.applied(), CartDiscountApplied::PerItem);

        Ok(())
    }

    #[test]
    fn strict_mode_requires_cart_level_discount() -> TestResult {
        let f = fixture()?;

        let resolver =
            PriceResolver::new(&f.catalog, &f.discounts, today()).with_config(ResolverConfig {
                cart_policy: CartDiscountPolicy::Strict,
                ..Default::default()
            });

        let result = resolver.resolve_cart(&cart(&f)?);

        assert!(matches!(result, Err(PricingError::AmbiguousDiscount)));

        Ok(())
    }

    #[test]
    fn empty_cart_resolves_to_empty() -> TestResult {
        let f = fixture()?;
        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());

        let resolution = resolver.resolve_cart(&Cart::new(GBP))?;

        assert!(resolution.is_empty());
        assert_eq!(resolution.total(), Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn unknown_cart_product_is_rejected() -> TestResult {
        let f = fixture()?;
        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());

        let cart = Cart::new(GBP).with_price(ProductKey::default(), Money::from_minor(100, GBP))?;

        assert!(matches!(
            resolver.resolve_cart(&cart),
            Err(PricingError::UnknownProduct(_))
        ));

        Ok(())
    }

    #[test]
    fn keys_and_order_are_preserved() -> TestResult {
        let mut f = fixture()?;

        f.discounts.add_cart(threshold(0, 0.3))?;

        let resolver = PriceResolver::new(&f.catalog, &f.discounts, today());
        let cart = cart(&f)?;

        let first = resolver.resolve_cart(&cart)?;
        let second = resolver.resolve_cart(&cart)?;

        assert_eq!(
            first.products().collect::<Vec<_>>(),
            cart.products().collect::<Vec<_>>()
        );
        assert_eq!(first, second);

        Ok(())
    }
}
