//! Catalog listing: filter, sort and paginate products for display.

use std::{cmp::Reverse, str::FromStr};

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    pricing::{PriceResolver, PricingError},
    products::{CategoryKey, Product, ProductKey},
    reviews::ReviewBook,
};

/// Errors raised while building a listing page.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Unrecognised sort field
    #[error("unknown sort field {0:?}")]
    UnknownSort(String),

    /// Unrecognised sort direction
    #[error("unknown sort direction {0:?}")]
    UnknownTrend(String),

    /// Page numbers start at 1 and pages hold at least one product.
    #[error("page {page} with {per_page} products per page is not a valid page")]
    InvalidPage {
        /// Requested page
        page: usize,

        /// Requested page size
        per_page: usize,
    },

    /// A price bound is in a different currency from the catalog (bound currency, catalog
    /// currency).
    #[error("Price bound has currency {0}, but catalog has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Resolving a display price failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Field products are sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Display price
    #[default]
    Price,

    /// Product name, case-insensitive
    Name,

    /// Number of distinct sellers
    Sellers,

    /// Number of reviews
    Reviews,

    /// Date added, most recent first when ascending
    Newest,
}

impl FromStr for SortField {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "price" => Ok(Self::Price),
            "name" => Ok(Self::Name),
            "sellers" => Ok(Self::Sellers),
            "reviews" => Ok(Self::Reviews),
            "newest" => Ok(Self::Newest),
            _ => Err(ListingError::UnknownSort(s.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Trend {
    /// Ascending
    #[default]
    Ascending,

    /// Descending
    Descending,
}

impl FromStr for Trend {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(Self::Ascending),
            "-" | "desc" => Ok(Self::Descending),
            _ => Err(ListingError::UnknownTrend(s.to_string())),
        }
    }
}

/// Sort order for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingSort {
    /// Field to sort by
    pub field: SortField,

    /// Direction
    pub trend: Trend,
}

impl ListingSort {
    /// Parse from the `sort` and `trend` query values.
    ///
    /// # Errors
    ///
    /// Returns a [`ListingError`] if either value is not recognised.
    pub fn parse(sort: &str, trend: &str) -> Result<Self, ListingError> {
        Ok(Self {
            field: sort.parse()?,
            trend: trend.parse()?,
        })
    }
}

/// Predicates a product must satisfy to be listed. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter<'a> {
    /// Case-insensitive substring of the product name
    pub name: Option<String>,

    /// Exact seller title that must have an offer for the product
    pub seller: Option<String>,

    /// Lowest display price, inclusive
    pub price_min: Option<Money<'a, Currency>>,

    /// Highest display price, inclusive
    pub price_max: Option<Money<'a, Currency>>,

    /// Only products with at least one unit in stock
    pub in_stock: bool,

    /// Only products with a free-delivery offer
    pub free_delivery: bool,

    /// Only products in this category
    pub category: Option<CategoryKey>,
}

impl ListingFilter<'_> {
    fn matches_product(&self, product: &Product) -> bool {
        let name_matches = self.name.as_deref().is_none_or(|needle| {
            product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });

        name_matches && self.category.is_none_or(|category| product.category == category)
    }

    fn matches_offers(&self, catalog: &Catalog<'_>, product: ProductKey) -> bool {
        if !self.free_delivery && self.seller.is_none() {
            return true;
        }

        catalog.offers_for(product).any(|offer| {
            let seller_matches = self.seller.as_deref().is_none_or(|title| {
                catalog
                    .seller(offer.seller)
                    .is_some_and(|seller| seller.title == title)
            });

            seller_matches && (!self.free_delivery || offer.free_delivery)
        })
    }

    fn matches_price(&self, price: &Money<'_, Currency>) -> bool {
        let minor = price.to_minor_units();

        self.price_min
            .is_none_or(|min| min.to_minor_units() <= minor)
            && self
                .price_max
                .is_none_or(|max| minor <= max.to_minor_units())
    }
}

/// Page request, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: usize,

    /// Products per page
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Page number, starting at 1
    pub page: usize,

    /// Requested page size
    pub per_page: usize,

    /// Number of items across all pages
    pub total: usize,

    /// Whether a later page exists
    pub has_more: bool,
}

/// A product as shown in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedProduct<'c, 'a> {
    /// Product key
    pub key: ProductKey,

    /// Product record
    pub product: &'c Product,

    /// Display price: the average offer price after item discounts
    pub price: Money<'a, Currency>,

    /// Distinct sellers offering the product
    pub sellers: usize,

    /// Units in stock across all offers
    pub stock: u64,

    /// Number of reviews
    pub reviews: usize,
}

impl ListedProduct<'_, '_> {
    /// Date the product was added.
    pub fn added_on(&self) -> Date {
        self.product.added_on
    }
}

/// Everything needed to produce one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery<'a> {
    /// Filter predicates
    pub filter: ListingFilter<'a>,

    /// Sort order
    pub sort: ListingSort,

    /// Page to return
    pub pagination: Pagination,
}

/// List the catalog's products matching `query`.
///
/// Products without offers have no display price and are never listed. Products in inactive
/// categories are skipped.
///
/// # Errors
///
/// Returns a [`ListingError`] if the page request is invalid, a price bound is in a different
/// currency from the catalog, or a display price cannot be resolved.
#[tracing::instrument(level = "debug", skip_all, fields(sort = ?query.sort, page = query.pagination.page))]
pub fn list<'c, 'a>(
    resolver: &PriceResolver<'c, 'a>,
    reviews: &ReviewBook,
    query: &ListingQuery<'a>,
) -> Result<Page<ListedProduct<'c, 'a>>, ListingError> {
    let Pagination { page, per_page } = query.pagination;

    if page == 0 || per_page == 0 {
        return Err(ListingError::InvalidPage { page, per_page });
    }

    let catalog = resolver.catalog();
    let filter = &query.filter;

    check_bound_currency(filter.price_min.as_ref(), catalog)?;
    check_bound_currency(filter.price_max.as_ref(), catalog)?;

    let mut listed = Vec::new();

    for (key, product) in catalog.products() {
        let category_active = catalog
            .category(product.category)
            .is_some_and(|category| category.active);

        if !category_active || !filter.matches_product(product) {
            continue;
        }

        let Some(average) = catalog.average_price(key) else {
            continue;
        };

        let stock = catalog.stock(key);

        if (filter.in_stock && stock == 0) || !filter.matches_offers(catalog, key) {
            continue;
        }

        let price = resolver.resolve_item_price(key, Some(average))?;

        if !filter.matches_price(&price) {
            continue;
        }

        listed.push(ListedProduct {
            key,
            product,
            price,
            sellers: catalog.seller_count(key),
            stock,
            reviews: reviews.count_for(key),
        });
    }

    sort(&mut listed, query.sort);

    let total = listed.len();

    let items: Vec<_> = listed
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    let has_more = page.saturating_mul(per_page) < total;

    debug!(total, returned = items.len(), has_more, "listed products");

    Ok(Page {
        items,
        page,
        per_page,
        total,
        has_more,
    })
}

fn sort(listed: &mut [ListedProduct<'_, '_>], order: ListingSort) {
    match order.field {
        SortField::Price => sort_by_key(listed, order.trend, |p| p.price.to_minor_units()),
        SortField::Name => sort_by_key(listed, order.trend, |p| p.product.name.to_lowercase()),
        SortField::Sellers => sort_by_key(listed, order.trend, |p| p.sellers),
        SortField::Reviews => sort_by_key(listed, order.trend, |p| p.reviews),
        SortField::Newest => sort_by_key(listed, order.trend, |p| Reverse(p.added_on())),
    }
}

/// Stable sort in either direction; equal keys keep catalog order.
fn sort_by_key<K: Ord>(
    listed: &mut [ListedProduct<'_, '_>],
    trend: Trend,
    key: impl Fn(&ListedProduct<'_, '_>) -> K,
) {
    listed.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b));

        match trend {
            Trend::Ascending => ordering,
            Trend::Descending => ordering.reverse(),
        }
    });
}

fn check_bound_currency(
    bound: Option<&Money<'_, Currency>>,
    catalog: &Catalog<'_>,
) -> Result<(), ListingError> {
    match bound {
        Some(bound) if bound.currency() != catalog.currency() => Err(
            ListingError::CurrencyMismatch(
                bound.currency().iso_alpha_code,
                catalog.currency().iso_alpha_code,
            ),
        ),
        _ => Ok(()),
    }
}
