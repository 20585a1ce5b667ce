//! Integration tests for single-product price resolution.
//!
//! The lower of the best percentage price and the best fixed-amount price wins, and a
//! fixed amount that would take the price to zero or below is clamped to the floor.

use decimal_percentage::Percentage;
use jiff::civil::{Date, date};
use rusty_money::{
    Money,
    iso::{Currency, GBP, JPY},
};
use smallvec::SmallVec;
use testresult::TestResult;

use storefront::prelude::*;

fn june() -> Date {
    date(2024, 6, 1)
}

fn all_year() -> ActivePeriod {
    ActivePeriod::new(date(2024, 1, 1), date(2024, 12, 31))
}

fn catalog_with_product() -> Result<(Catalog<'static>, ProductKey, CategoryKey), CatalogError> {
    catalog_in(GBP)
}

fn catalog_in(
    currency: &'static Currency,
) -> Result<(Catalog<'static>, ProductKey, CategoryKey), CatalogError> {
    let mut catalog = Catalog::new(currency);

    let category = catalog.add_category(Category {
        name: "Headphones".to_string(),
        active: true,
    });

    let product = catalog.add_product(Product {
        name: "Studio Headphones".to_string(),
        category,
        features: SmallVec::new(),
        added_on: date(2024, 1, 1),
    })?;

    Ok((catalog, product, category))
}

#[test]
fn lower_of_percent_and_amount_price_wins() -> TestResult {
    let (catalog, product, _) = catalog_with_product()?;
    let mut book = DiscountBook::new(GBP);

    book.add_item(ItemDiscount::new(
        "Twenty off",
        Scope::Product(product),
        DiscountValue::Percent(Percentage::from(0.20)),
        0,
        all_year(),
    ))?;

    let amount = book.add_item(ItemDiscount::new(
        "Ninety off",
        Scope::Product(product),
        DiscountValue::AmountOff(Money::from_minor(9_000, GBP)),
        0,
        all_year(),
    ))?;

    let resolver = PriceResolver::new(&catalog, &book, june());
    let resolution = resolver.resolve_item(product, Some(Money::from_minor(10_000, GBP)))?;

    assert_eq!(resolution.price, Money::from_minor(1_000, GBP));
    assert_eq!(
        resolution.applied,
        Some(AppliedItemDiscount {
            key: amount,
            floored: false,
        })
    );

    Ok(())
}

#[test]
fn amount_beyond_price_is_clamped_to_floor() -> TestResult {
    let (catalog, product, category) = catalog_with_product()?;
    let mut book = DiscountBook::new(GBP);

    book.add_item(ItemDiscount::new(
        "Sixty off",
        Scope::Category(category),
        DiscountValue::AmountOff(Money::from_minor(6_000, GBP)),
        0,
        all_year(),
    ))?;

    let resolver = PriceResolver::new(&catalog, &book, june());
    let price = resolver.resolve_item_price(product, Some(Money::from_minor(5_000, GBP)))?;

    assert_eq!(price, Money::from_minor(100, GBP));

    Ok(())
}

#[test]
fn floor_follows_resolver_config() -> TestResult {
    let (catalog, product, _) = catalog_with_product()?;
    let mut book = DiscountBook::new(GBP);

    book.add_item(ItemDiscount::new(
        "Everything off",
        Scope::Product(product),
        DiscountValue::AmountOff(Money::from_minor(5_000, GBP)),
        0,
        all_year(),
    ))?;

    let resolver = PriceResolver::new(&catalog, &book, june()).with_config(ResolverConfig {
        floor_minor: Some(1),
        ..ResolverConfig::default()
    });

    let price = resolver.resolve_item_price(product, Some(Money::from_minor(5_000, GBP)))?;

    assert_eq!(price, Money::from_minor(1, GBP));

    Ok(())
}

#[test]
fn expired_discounts_leave_price_unchanged() -> TestResult {
    let (catalog, product, _) = catalog_with_product()?;
    let mut book = DiscountBook::new(GBP);

    book.add_item(ItemDiscount::new(
        "January sale",
        Scope::Product(product),
        DiscountValue::Percent(Percentage::from(0.50)),
        0,
        ActivePeriod::new(date(2024, 1, 1), date(2024, 1, 31)),
    ))?;

    let resolver = PriceResolver::new(&catalog, &book, june());
    let resolution = resolver.resolve_item(product, Some(Money::from_minor(7_500, GBP)))?;

    assert_eq!(resolution.price, Money::from_minor(7_500, GBP));
    assert!(!resolution.is_discounted());

    Ok(())
}

#[test]
fn product_without_offers_or_price_is_not_found() -> TestResult {
    let (catalog, product, _) = catalog_with_product()?;
    let book = DiscountBook::new(GBP);

    let resolver = PriceResolver::new(&catalog, &book, june());

    assert!(matches!(
        resolver.resolve_item_price(product, None),
        Err(PricingError::NotFound(key)) if key == product
    ));

    Ok(())
}

#[test]
fn floor_is_one_unit_of_a_zero_decimal_currency() -> TestResult {
    let (catalog, product, _) = catalog_in(JPY)?;
    let mut book = DiscountBook::new(JPY);

    book.add_item(ItemDiscount::new(
        "Six hundred yen off",
        Scope::Product(product),
        DiscountValue::AmountOff(Money::from_minor(600, JPY)),
        0,
        all_year(),
    ))?;

    let resolver = PriceResolver::new(&catalog, &book, june());
    let resolution = resolver.resolve_item(product, Some(Money::from_minor(500, JPY)))?;

    assert_eq!(resolution.price, Money::from_minor(1, JPY));
    assert!(resolution.applied.is_some_and(|applied| applied.floored));

    Ok(())
}

#[test]
fn price_in_another_currency_is_rejected() -> TestResult {
    let (catalog, product, _) = catalog_with_product()?;
    let book = DiscountBook::new(GBP);

    let resolver = PriceResolver::new(&catalog, &book, june());

    assert!(matches!(
        resolver.resolve_item_price(product, Some(Money::from_minor(500, JPY))),
        Err(PricingError::CurrencyMismatch("JPY", "GBP"))
    ));

    Ok(())
}
