//! Product Comparison
//!
//! A compare list is a small, ordered set of products chosen by a customer. Comparing it
//! lines up the products' features side by side. Only products from the same category can be
//! compared.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::Catalog,
    products::{CategoryKey, Product, ProductKey},
};

/// Errors raised while comparing products.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// Products span more than one category.
    #[error("products from different categories cannot be compared")]
    CategoryMismatch,

    /// Fewer than two products were chosen.
    #[error("choose at least two products to compare")]
    NotEnoughProducts,

    /// A chosen product is not in the catalog.
    #[error("unknown product")]
    UnknownProduct(ProductKey),
}

/// Products chosen for comparison, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareList {
    products: SmallVec<[ProductKey; 4]>,
}

impl CompareList {
    /// Create an empty compare list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a list that includes `product`. Adding a listed product changes nothing.
    #[must_use]
    pub fn with_product(mut self, product: ProductKey) -> Self {
        if !self.products.contains(&product) {
            self.products.push(product);
        }

        self
    }

    /// Return a list without `product`.
    #[must_use]
    pub fn without_product(mut self, product: ProductKey) -> Self {
        self.products.retain(|p| *p != product);
        self
    }

    /// Chosen products
    pub fn products(&self) -> &[ProductKey] {
        &self.products
    }

    /// Number of chosen products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether no products are chosen.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Compare the chosen products.
    ///
    /// # Errors
    ///
    /// Returns a [`CompareError`] if fewer than two products are chosen, a product is unknown,
    /// or the products are not all in the same category.
    pub fn compare<'c>(&self, catalog: &'c Catalog<'_>) -> Result<Comparison<'c>, CompareError> {
        if self.products.len() < 2 {
            return Err(CompareError::NotEnoughProducts);
        }

        let products = self
            .products
            .iter()
            .map(|&key| {
                catalog
                    .product(key)
                    .map(|product| (key, product))
                    .ok_or(CompareError::UnknownProduct(key))
            })
            .collect::<Result<Vec<(ProductKey, &Product)>, CompareError>>()?;

        let category = products
            .first()
            .map(|(_, product)| product.category)
            .ok_or(CompareError::NotEnoughProducts)?;

        if products.iter().any(|(_, product)| product.category != category) {
            return Err(CompareError::CategoryMismatch);
        }

        let mut seen = FxHashSet::default();
        let mut rows = Vec::new();

        for feature in products.iter().flat_map(|&(_, product)| product.features.iter()) {
            if !seen.insert(feature.name.as_str()) {
                continue;
            }

            let values: SmallVec<[Option<&str>; 4]> = products
                .iter()
                .map(|&(_, product)| product.feature(&feature.name))
                .collect();

            let differs = values.windows(2).any(|pair| pair.first() != pair.last());

            rows.push(FeatureRow {
                name: feature.name.as_str(),
                values,
                differs,
            });
        }

        Ok(Comparison {
            category,
            products,
            rows,
        })
    }
}

/// One feature across every compared product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow<'c> {
    /// Feature name
    pub name: &'c str,

    /// Value per product, in compare-list order; `None` when a product lacks the feature.
    pub values: SmallVec<[Option<&'c str>; 4]>,

    /// Whether the values are not all the same.
    pub differs: bool,
}

/// Side-by-side comparison of products from one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison<'c> {
    /// Shared category
    pub category: CategoryKey,

    /// Compared products, in compare-list order
    pub products: Vec<(ProductKey, &'c Product)>,

    /// Feature rows, in order of first appearance
    pub rows: Vec<FeatureRow<'c>>,
}

impl<'c> Comparison<'c> {
    /// Rows whose values differ between products.
    pub fn differences(&self) -> impl Iterator<Item = &FeatureRow<'c>> {
        self.rows.iter().filter(|row| row.differs)
    }
}
