//! Catalog Fixtures

use jiff::civil::Date;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::products::Feature;

/// Catalog YAML file
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO currency code every price in the catalog uses
    pub currency: String,

    /// Categories, in display order
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,

    /// Products
    #[serde(default)]
    pub products: Vec<ProductFixture>,

    /// Sellers
    #[serde(default)]
    pub sellers: Vec<SellerFixture>,

    /// Offers linking products and sellers
    #[serde(default)]
    pub offers: Vec<OfferFixture>,
}

/// Category Fixture
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Fixture key
    pub id: String,

    /// Category name
    pub name: String,

    /// Whether the category is shown
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Fixture key
    pub id: String,

    /// Product name
    pub name: String,

    /// Category fixture key
    pub category: String,

    /// Date added (e.g. `2024-03-01`)
    pub added_on: Date,

    /// Features, in display order
    #[serde(default)]
    pub features: Vec<FeatureFixture>,
}

/// Feature Fixture
#[derive(Debug, Deserialize)]
pub struct FeatureFixture {
    /// Feature name
    pub name: String,

    /// Feature value
    pub value: String,
}

impl ProductFixture {
    /// Product features in catalog form.
    pub fn features(&self) -> SmallVec<[Feature; 8]> {
        self.features
            .iter()
            .map(|f| Feature::new(f.name.clone(), f.value.clone()))
            .collect()
    }
}

/// Seller Fixture
#[derive(Debug, Deserialize)]
pub struct SellerFixture {
    /// Fixture key
    pub id: String,

    /// Seller title
    pub title: String,
}

/// Offer Fixture
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Product fixture key
    pub product: String,

    /// Seller fixture key
    pub seller: String,

    /// Offer price (e.g., "499.00 GBP")
    pub price: String,

    /// Units in stock
    #[serde(default)]
    pub quantity: u32,

    /// Whether the seller delivers for free
    #[serde(default)]
    pub free_delivery: bool,
}
