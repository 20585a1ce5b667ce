//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    catalog::{
        Catalog, CatalogError,
        listing::{
            ListedProduct, ListingError, ListingFilter, ListingQuery, ListingSort, Page,
            Pagination, SortField, Trend, list,
        },
    },
    compare::{CompareError, CompareList, Comparison, FeatureRow},
    customers::CustomerKey,
    discounts::{
        ActivePeriod, DiscountError, DiscountValue, Scope,
        book::DiscountBook,
        cart::{CartBounds, CartDiscount, CartDiscountKey},
        item::{ItemDiscount, ItemDiscountKey},
        set::{SetDiscount, SetDiscountKey},
    },
    fixtures::{Fixture, FixtureError},
    history::ViewHistory,
    offers::{MarketOffer, OfferKey, Seller, SellerKey},
    pricing::{
        CartDiscountPolicy, PriceResolver, Priceable, PricingError, ResolverConfig,
        cart::{CartDiscountApplied, CartResolution, LineResolution},
        item::{AppliedItemDiscount, ItemResolution},
    },
    products::{Category, CategoryKey, Feature, Product, ProductKey},
    receipt::{Receipt, ReceiptError},
    reviews::{Review, ReviewBook, ReviewError, ReviewKey},
};
