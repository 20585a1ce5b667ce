//! Reviews
//!
//! Customer reviews of products. Review counts feed the catalog listing's `reviews` sort.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::{catalog::Catalog, customers::CustomerKey, products::ProductKey};

new_key_type! {
    /// Review Key
    pub struct ReviewKey;
}

/// Errors raised when a review is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Review text is empty or whitespace.
    #[error("review text must not be empty")]
    EmptyText,

    /// The reviewed product is not in the catalog.
    #[error("unknown product")]
    UnknownProduct(ProductKey),
}

/// A single review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Author
    pub customer: CustomerKey,

    /// Reviewed product
    pub product: ProductKey,

    /// Review text, trimmed
    pub text: String,

    /// When the review was written
    pub at: Timestamp,
}

/// Review Book
#[derive(Debug, Default)]
pub struct ReviewBook {
    reviews: SlotMap<ReviewKey, Review>,
    counts: FxHashMap<ProductKey, usize>,
}

impl ReviewBook {
    /// Create an empty review book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer's review of a product.
    ///
    /// # Errors
    ///
    /// Returns a [`ReviewError`] if the text is blank or the product is not in `catalog`.
    pub fn add_review(
        &mut self,
        catalog: &Catalog<'_>,
        customer: CustomerKey,
        product: ProductKey,
        text: &str,
        at: Timestamp,
    ) -> Result<ReviewKey, ReviewError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(ReviewError::EmptyText);
        }

        if catalog.product(product).is_none() {
            return Err(ReviewError::UnknownProduct(product));
        }

        let key = self.reviews.insert(Review {
            customer,
            product,
            text: text.to_string(),
            at,
        });

        *self.counts.entry(product).or_default() += 1;

        debug!(?product, ?customer, "review added");

        Ok(key)
    }

    /// Get a review.
    pub fn review(&self, key: ReviewKey) -> Option<&Review> {
        self.reviews.get(key)
    }

    /// Reviews of a product, oldest first.
    pub fn for_product(&self, product: ProductKey) -> Vec<&Review> {
        let mut reviews: Vec<&Review> = self
            .reviews
            .values()
            .filter(|review| review.product == product)
            .collect();

        reviews.sort_by_key(|review| review.at);

        reviews
    }

    /// Number of reviews of a product.
    pub fn count_for(&self, product: ProductKey) -> usize {
        self.counts.get(&product).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::GBP;
    use slotmap::SlotMap;
    use smallvec::SmallVec;
    use testresult::TestResult;

    use crate::products::{Category, Product};

    use super::*;

    fn catalog<'a>() -> TestResult<(Catalog<'a>, ProductKey)> {
        let mut catalog = Catalog::new(GBP);

        let category = catalog.add_category(Category {
            name: "Books".to_string(),
            active: true,
        });

        let book = catalog.add_product(Product {
            name: "Novel".to_string(),
            category,
            features: SmallVec::new(),
            added_on: date(2024, 1, 1),
        })?;

        Ok((catalog, book))
    }

    fn customer() -> CustomerKey {
        SlotMap::<CustomerKey, ()>::with_key().insert(())
    }

    #[test]
    fn add_review_counts_per_product() -> TestResult {
        let (catalog, book) = catalog()?;
        let mut reviews = ReviewBook::new();
        let who = customer();

        let later: Timestamp = "2024-02-01T00:00:00Z".parse()?;
        let earlier: Timestamp = "2024-01-01T00:00:00Z".parse()?;

        reviews.add_review(&catalog, who, book, "  Loved it ", later)?;
        reviews.add_review(&catalog, who, book, "Read it again", earlier)?;

        assert_eq!(reviews.count_for(book), 2);

        let texts: Vec<&str> = reviews
            .for_product(book)
            .iter()
            .map(|review| review.text.as_str())
            .collect();

        assert_eq!(texts, vec!["Read it again", "Loved it"]);

        Ok(())
    }

    #[test]
    fn blank_review_is_rejected() -> TestResult {
        let (catalog, book) = catalog()?;
        let mut reviews = ReviewBook::new();

        let result = reviews.add_review(&catalog, customer(), book, "   ", Timestamp::UNIX_EPOCH);

        assert_eq!(result, Err(ReviewError::EmptyText));
        assert_eq!(reviews.count_for(book), 0);

        Ok(())
    }

    #[test]
    fn unknown_product_is_rejected() {
        let catalog = Catalog::new(GBP);
        let mut reviews = ReviewBook::new();
        let missing = ProductKey::default();

        let result = reviews.add_review(&catalog, customer(), missing, "Great", Timestamp::UNIX_EPOCH);

        assert_eq!(result, Err(ReviewError::UnknownProduct(missing)));
    }
}
