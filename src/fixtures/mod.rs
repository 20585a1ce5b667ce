//! Fixtures
//!
//! YAML fixture sets live under `<base>/<kind>/<name>.yml` for the kinds `catalog`,
//! `discounts` and `carts`. Records refer to each other by string keys, which are mapped to
//! slotmap keys as they are loaded.

use std::{fs, path::PathBuf};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    discounts::{
        ActivePeriod, DiscountValue, Scope,
        book::{DiscountBook, DiscountValidationError},
        cart::{CartBounds, CartDiscount},
        item::ItemDiscount,
        set::SetDiscount,
    },
    fixtures::{
        carts::CartFixture,
        catalog::CatalogFixture,
        discounts::{DiscountsFixture, ScopeFixture},
    },
    offers::{MarketOffer, Seller, SellerKey},
    products::{Category, CategoryKey, Product, ProductKey},
};

pub mod carts;
pub mod catalog;
pub mod discounts;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Seller not found
    #[error("Seller not found: {0}")]
    SellerNotFound(String),

    /// The seller has no offer for the product (product, seller)
    #[error("Seller {1} has no offer for product {0}")]
    OfferNotFound(String, String),

    /// A cart line has no explicit price and the product has no offers
    #[error("No price for cart line: {0}")]
    NoPrice(String),

    /// Invalid scope: exactly one of `product` and `category` must be set
    #[error("Invalid scope in discount: {0}")]
    InvalidScope(String),

    /// Invalid discount value: exactly one of `percent` and `amount` must be set
    #[error("Invalid discount value: {0}")]
    InvalidDiscountValue(String),

    /// No catalog loaded yet
    #[error("No catalog loaded yet")]
    NoCatalog,

    /// No discounts loaded yet
    #[error("No discounts loaded yet")]
    NoDiscounts,

    /// Catalog rejected a record
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Discount book rejected a record
    #[error(transparent)]
    Discount(#[from] DiscountValidationError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Option<Catalog<'a>>,
    discounts: Option<DiscountBook<'a>>,

    /// String key -> `SlotMap` key mappings for lookups
    category_keys: FxHashMap<String, CategoryKey>,
    product_keys: FxHashMap<String, ProductKey>,
    seller_keys: FxHashMap<String, SellerKey>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            discounts: None,
            category_keys: FxHashMap::default(),
            product_keys: FxHashMap::default(),
            seller_keys: FxHashMap::default(),
        }
    }

    /// Load a catalog from a YAML fixture file, replacing any catalog loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a record refers to an unknown key,
    /// or a price is in a different currency from the catalog.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("catalog", name)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        let mut catalog = Catalog::new(parse_currency(&fixture.currency)?);

        self.category_keys.clear();
        self.product_keys.clear();
        self.seller_keys.clear();
        self.discounts = None;

        for category in fixture.categories {
            let key = catalog.add_category(Category {
                name: category.name,
                active: category.active,
            });

            self.category_keys.insert(category.id, key);
        }

        for product in fixture.products {
            let features = product.features();
            let category = self.category_key(&product.category)?;

            let key = catalog.add_product(Product {
                name: product.name,
                category,
                features,
                added_on: product.added_on,
            })?;

            self.product_keys.insert(product.id, key);
        }

        for seller in fixture.sellers {
            let key = catalog.add_seller(Seller {
                title: seller.title,
            });

            self.seller_keys.insert(seller.id, key);
        }

        for offer in fixture.offers {
            let mut market_offer = MarketOffer::new(
                self.product_key(&offer.product)?,
                self.seller_key(&offer.seller)?,
                parse_money(&offer.price)?,
            )
            .with_quantity(offer.quantity);

            if offer.free_delivery {
                market_offer = market_offer.with_free_delivery();
            }

            catalog.add_offer(market_offer)?;
        }

        debug!(
            name,
            products = self.product_keys.len(),
            sellers = self.seller_keys.len(),
            "loaded catalog fixture"
        );

        self.catalog = Some(catalog);

        Ok(self)
    }

    /// Load discounts from a YAML fixture file, replacing any discounts loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded, the file cannot be read or parsed, a record
    /// refers to an unknown key, or a record fails validation.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.catalog()?.currency();
        let contents = self.read("discounts", name)?;
        let fixture: DiscountsFixture = serde_norway::from_str(&contents)?;

        let mut book = DiscountBook::new(currency);

        for item in fixture.items {
            let value = match (item.percent.as_deref(), item.amount.as_deref()) {
                (Some(percent), None) => DiscountValue::Percent(parse_percentage(percent)?),
                (None, Some(amount)) => DiscountValue::AmountOff(parse_money(amount)?),
                _ => return Err(FixtureError::InvalidDiscountValue(item.name)),
            };

            let scope = self.scope(&item.name, &item.scope)?;

            book.add_item(ItemDiscount::new(
                item.name,
                scope,
                value,
                item.weight,
                ActivePeriod::new(item.start, item.end),
            ))?;
        }

        for set in fixture.sets {
            let [first, second] = &set.slots;
            let slots = [self.scope(&set.name, first)?, self.scope(&set.name, second)?];

            book.add_set(SetDiscount::new(
                set.name,
                slots,
                parse_percentage(&set.percent)?,
                set.weight,
                ActivePeriod::new(set.start, set.end),
            ))?;
        }

        for cart in fixture.carts {
            let bounds = CartBounds {
                min_items: cart.min_items,
                max_items: cart.max_items,
                min_cost: parse_money(&cart.min_cost)?,
                max_cost: parse_money(&cart.max_cost)?,
            };

            book.add_cart(CartDiscount::new(
                cart.name,
                parse_percentage(&cart.percent)?,
                cart.weight,
                ActivePeriod::new(cart.start, cart.end),
                bounds,
            ))?;
        }

        debug!(name, discounts = book.len(), "loaded discounts fixture");

        self.discounts = Some(book);

        Ok(self)
    }

    /// Build a cart from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded, the file cannot be read or parsed, a line
    /// refers to an unknown key, or no price can be found for a line.
    pub fn load_cart(&self, name: &str) -> Result<Cart<'a>, FixtureError> {
        let catalog = self.catalog()?;
        let contents = self.read("carts", name)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        let mut cart = Cart::new(catalog.currency());

        for line in fixture.lines {
            let product = self.product_key(&line.product)?;

            let price = match (&line.price, &line.seller) {
                (Some(price), _) => parse_money(price)?,
                (None, Some(seller)) => {
                    let seller_key = self.seller_key(seller)?;

                    catalog
                        .offers_for(product)
                        .find(|offer| offer.seller == seller_key)
                        .map(|offer| offer.price)
                        .ok_or_else(|| {
                            FixtureError::OfferNotFound(line.product.clone(), seller.clone())
                        })?
                }
                (None, None) => catalog
                    .reference_price(product)
                    .ok_or_else(|| FixtureError::NoPrice(line.product.clone()))?,
            };

            cart = cart.with_price(product, price)?;
        }

        Ok(cart)
    }

    /// Load the catalog and discounts sharing a name.
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?.load_discounts(name)?;

        Ok(fixture)
    }

    /// Loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog has been loaded.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Loaded discounts
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoDiscounts`] if no discounts have been loaded.
    pub fn discounts(&self) -> Result<&DiscountBook<'a>, FixtureError> {
        self.discounts.as_ref().ok_or(FixtureError::NoDiscounts)
    }

    /// Get a category key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found.
    pub fn category_key(&self, key: &str) -> Result<CategoryKey, FixtureError> {
        self.category_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a seller key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the seller is not found.
    pub fn seller_key(&self, key: &str) -> Result<SellerKey, FixtureError> {
        self.seller_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::SellerNotFound(key.to_string()))
    }

    fn scope(&self, discount: &str, scope: &ScopeFixture) -> Result<Scope, FixtureError> {
        match (&scope.product, &scope.category) {
            (Some(product), None) => Ok(Scope::Product(self.product_key(product)?)),
            (None, Some(category)) => Ok(Scope::Category(self.category_key(category)?)),
            _ => Err(FixtureError::InvalidScope(discount.to_string())),
        }
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than GBP, USD and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is not
/// a decimal number, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, parse_currency(code)?))
}

/// Parse a price string into money.
///
/// # Errors
///
/// See [`parse_price`].
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string is not a decimal number.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(points) => (points.trim(), Decimal::ONE_HUNDRED),
        None => (trimmed, Decimal::ONE),
    };

    let value = number
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(value / scale))
}
