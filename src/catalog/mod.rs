//! Catalog
//!
//! An in-memory snapshot of categories, products, sellers and market offers.
//! The snapshot is read-only input to pricing and listing; it is built once
//! per request by whatever owns the storage.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    offers::{MarketOffer, OfferKey, Seller, SellerKey},
    products::{Category, CategoryKey, Product, ProductKey},
};

pub mod listing;

/// Errors raised while building a catalog snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The product's category is not in the catalog.
    #[error("unknown category")]
    UnknownCategory(CategoryKey),

    /// The offer references a product that is not in the catalog.
    #[error("unknown product")]
    UnknownProduct(ProductKey),

    /// The offer references a seller that is not in the catalog.
    #[error("unknown seller")]
    UnknownSeller(SellerKey),

    /// Offer currency differs from the catalog currency (offer currency, catalog currency).
    #[error("Offer has currency {0}, but catalog has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// Catalog snapshot
#[derive(Debug)]
pub struct Catalog<'a> {
    categories: SlotMap<CategoryKey, Category>,
    products: SlotMap<ProductKey, Product>,
    sellers: SlotMap<SellerKey, Seller>,
    offers: SlotMap<OfferKey, MarketOffer<'a>>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            categories: SlotMap::with_key(),
            products: SlotMap::with_key(),
            sellers: SlotMap::with_key(),
            offers: SlotMap::with_key(),
            currency,
        }
    }

    /// Add a category.
    pub fn add_category(&mut self, category: Category) -> CategoryKey {
        self.categories.insert(category)
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] if the product's category has not been added.
    pub fn add_product(&mut self, product: Product) -> Result<ProductKey, CatalogError> {
        if !self.categories.contains_key(product.category) {
            return Err(CatalogError::UnknownCategory(product.category));
        }

        Ok(self.products.insert(product))
    }

    /// Add a seller.
    pub fn add_seller(&mut self, seller: Seller) -> SellerKey {
        self.sellers.insert(seller)
    }

    /// Add a market offer.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product or seller is unknown, or the offer is priced
    /// in a different currency to the catalog.
    pub fn add_offer(&mut self, offer: MarketOffer<'a>) -> Result<OfferKey, CatalogError> {
        if !self.products.contains_key(offer.product) {
            return Err(CatalogError::UnknownProduct(offer.product));
        }

        if !self.sellers.contains_key(offer.seller) {
            return Err(CatalogError::UnknownSeller(offer.seller));
        }

        let offer_currency = offer.price.currency();

        if offer_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                offer_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        Ok(self.offers.insert(offer))
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get a product.
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Get a category.
    pub fn category(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.get(key)
    }

    /// Get a seller.
    pub fn seller(&self, key: SellerKey) -> Option<&Seller> {
        self.sellers.get(key)
    }

    /// Get an offer.
    pub fn offer(&self, key: OfferKey) -> Option<&MarketOffer<'a>> {
        self.offers.get(key)
    }

    /// Iterate over all products.
    pub fn products(&self) -> impl Iterator<Item = (ProductKey, &Product)> {
        self.products.iter()
    }

    /// Categories shown in the storefront.
    pub fn active_categories(&self) -> impl Iterator<Item = (CategoryKey, &Category)> {
        self.categories.iter().filter(|(_, category)| category.active)
    }

    /// Iterate over every offer for a product.
    pub fn offers_for(&self, product: ProductKey) -> impl Iterator<Item = &MarketOffer<'a>> {
        self.offers
            .values()
            .filter(move |offer| offer.product == product)
    }

    /// The highest price any seller asks for the product.
    ///
    /// This is the reference ("old") price discounts are taken from when the caller does not
    /// supply one.
    pub fn reference_price(&self, product: ProductKey) -> Option<Money<'a, Currency>> {
        self.offers_for(product)
            .max_by_key(|offer| offer.price.to_minor_units())
            .map(|offer| offer.price)
    }

    /// Mean of all offer prices for the product, rounded to the nearest minor unit.
    pub fn average_price(&self, product: ProductKey) -> Option<Money<'a, Currency>> {
        let (sum, count) = self
            .offers_for(product)
            .fold((0_i64, 0_i64), |(sum, count), offer| {
                (
                    sum.saturating_add(offer.price.to_minor_units()),
                    count.saturating_add(1),
                )
            });

        if count == 0 {
            return None;
        }

        let mean = Decimal::from_i64(sum)? / Decimal::from_i64(count)?;
        let minor = mean
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;

        Some(Money::from_minor(minor, self.currency))
    }

    /// Number of distinct sellers offering the product.
    pub fn seller_count(&self, product: ProductKey) -> usize {
        self.offers_for(product)
            .map(|offer| offer.seller)
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Total units in stock across every seller.
    pub fn stock(&self, product: ProductKey) -> u64 {
        self.offers_for(product)
            .map(|offer| u64::from(offer.quantity))
            .sum()
    }
}
