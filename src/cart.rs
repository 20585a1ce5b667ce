//! Cart
//!
//! A cart maps each product to the price it was listed at when added. Carts are values:
//! every modifying operation consumes the cart and returns the new one.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{offers::MarketOffer, products::ProductKey};

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A price's currency differs from the cart currency (price currency, cart currency).
    #[error("Price has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A product was not found in the cart.
    #[error("Product not in cart")]
    ProductNotFound(ProductKey),
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a> {
    lines: Vec<(ProductKey, Money<'a, Currency>)>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from `(product, price)` pairs. Later duplicates replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] if any price is in a different currency.
    pub fn with_lines(
        lines: impl IntoIterator<Item = (ProductKey, Money<'a, Currency>)>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        lines
            .into_iter()
            .try_fold(Self::new(currency), |cart, (product, price)| {
                cart.with_price(product, price)
            })
    }

    /// Return a cart with `product` listed at `price`, replacing any existing price.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] if the price is in a different currency.
    pub fn with_price(
        mut self,
        product: ProductKey,
        price: Money<'a, Currency>,
    ) -> Result<Self, CartError> {
        let price_currency = price.currency();

        if price_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                price_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        match self.lines.iter_mut().find(|(key, _)| *key == product) {
            Some(line) => line.1 = price,
            None => self.lines.push((product, price)),
        }

        Ok(self)
    }

    /// Return a cart with the offered product at the seller's price.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::CurrencyMismatch`] if the offer is in a different currency.
    pub fn with_offer(self, offer: &MarketOffer<'a>) -> Result<Self, CartError> {
        self.with_price(offer.product, offer.price)
    }

    /// Return a cart without `product`.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::ProductNotFound`] if the product is not in the cart.
    pub fn without_product(mut self, product: ProductKey) -> Result<Self, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|(key, _)| *key == product)
            .ok_or(CartError::ProductNotFound(product))?;

        self.lines.remove(idx);

        Ok(self)
    }

    /// Listed price for a product.
    pub fn price(&self, product: ProductKey) -> Option<&Money<'a, Currency>> {
        self.lines
            .iter()
            .find(|(key, _)| *key == product)
            .map(|(_, price)| price)
    }

    /// Whether the cart holds `product`.
    pub fn contains(&self, product: ProductKey) -> bool {
        self.price(product).is_some()
    }

    /// Calculate the subtotal of the cart.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .map(|(_, price)| price.to_minor_units())
            .sum::<i64>();

        Money::from_minor(minor, self.currency)
    }

    /// Iterate over `(product, price)` lines in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &(ProductKey, Money<'a, Currency>)> {
        self.lines.iter()
    }

    /// Iterate over the products in the cart.
    pub fn products(&self) -> impl Iterator<Item = ProductKey> + '_ {
        self.lines.iter().map(|(product, _)| *product)
    }

    /// Get the number of products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
