//! Products

use jiff::civil::Date;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

new_key_type! {
    /// Category Key
    pub struct CategoryKey;
}

/// A named characteristic of a product (e.g. "Screen size" = "6.1\"").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature name
    pub name: String,

    /// Feature value
    pub value: String,
}

impl Feature {
    /// Create a new feature.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product name
    pub name: String,

    /// Category the product is listed under
    pub category: CategoryKey,

    /// Product features, in display order
    pub features: SmallVec<[Feature; 8]>,

    /// Date the product was added to the catalog
    pub added_on: Date,
}

impl Product {
    /// Look up a feature value by name.
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|feature| feature.name == name)
            .map(|feature| feature.value.as_str())
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category name
    pub name: String,

    /// Only active categories are shown in the storefront.
    pub active: bool,
}
