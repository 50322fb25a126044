//! Application state shared across handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use riziky_core::Catalog;
use riziky_core::admin::SalesStats;
use riziky_core::types::OrderId;

use crate::config::StorefrontConfig;

/// First order number handed out after startup.
const FIRST_ORDER_ID: i32 = 12345;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the read-only shop data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    sales: SalesStats,
    next_order_id: AtomicI32,
}

impl AppState {
    /// Create a new application state serving the demo catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_catalog(config, Catalog::demo())
    }

    /// Create a new application state serving `catalog`.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                sales: SalesStats::demo(),
                next_order_id: AtomicI32::new(FIRST_ORDER_ID),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the dashboard sales figures.
    #[must_use]
    pub fn sales(&self) -> &SalesStats {
        &self.inner.sales
    }

    /// Allocate the next order number.
    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        OrderId::new(self.inner.next_order_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Wait out the configured backend delay.
    pub async fn simulate_latency(&self) {
        let delay = self.inner.config.simulated_latency;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
