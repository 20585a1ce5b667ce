//! View History
//!
//! Records which products each customer has looked at. Recording the same product again only
//! moves its timestamp forward.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{customers::CustomerKey, products::ProductKey};

/// Per-customer record of viewed products.
#[derive(Debug, Default, Clone)]
pub struct ViewHistory {
    views: FxHashMap<CustomerKey, FxHashMap<ProductKey, Timestamp>>,
}

impl ViewHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `customer` viewed `product` at `viewed_at`.
    ///
    /// An older timestamp never replaces a newer one.
    pub fn record(&mut self, customer: CustomerKey, product: ProductKey, viewed_at: Timestamp) {
        let last = self
            .views
            .entry(customer)
            .or_default()
            .entry(product)
            .or_insert(viewed_at);

        if viewed_at > *last {
            *last = viewed_at;
        }

        debug!(?customer, ?product, %viewed_at, "recorded product view");
    }

    /// Last time `customer` viewed `product`.
    pub fn last_viewed(&self, customer: CustomerKey, product: ProductKey) -> Option<Timestamp> {
        self.views.get(&customer)?.get(&product).copied()
    }

    /// Up to `limit` products `customer` viewed, most recent first.
    pub fn recent(&self, customer: CustomerKey, limit: usize) -> Vec<(ProductKey, Timestamp)> {
        let Some(views) = self.views.get(&customer) else {
            return Vec::new();
        };

        let mut recent: Vec<(ProductKey, Timestamp)> =
            views.iter().map(|(product, at)| (*product, *at)).collect();

        recent.sort_by(|a, b| b.1.cmp(&a.1));
        recent.truncate(limit);

        recent
    }

    /// Number of distinct products `customer` has viewed.
    pub fn len_for(&self, customer: CustomerKey) -> usize {
        self.views.get(&customer).map_or(0, FxHashMap::len)
    }
}
