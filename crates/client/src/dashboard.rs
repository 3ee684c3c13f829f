//! The dashboard: one cache per screen plus the writes that span screens.
//!
//! Stock movements change a product's item count on the server, so
//! recording one reloads the catalog as well as the ledger it was written
//! to. Product writes likewise refresh the owner-scoped product view.

use std::sync::Arc;

use stockroom_core::low_stock::StockSummary;
use stockroom_core::product::{Product, ProductDraft};
use stockroom_core::stock::{Direction, StockMovementDraft};
use stockroom_core::types::EntityId;

use crate::api::InventoryApi;
use crate::cache::{ListCache, LoadOutcome};
use crate::collection::{
    Mutation, OwnerDirectory, ProductCatalog, ProductScope, StockLedger,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, CacheError};

/// Result of [`Dashboard::refresh_all`], one outcome per list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub products: LoadOutcome,
    pub owners: LoadOutcome,
    pub stock_ins: LoadOutcome,
    pub stock_outs: LoadOutcome,
}

impl RefreshReport {
    /// Banners from every list whose load failed.
    pub fn failures(&self) -> Vec<&str> {
        [&self.products, &self.owners, &self.stock_ins, &self.stock_outs]
            .into_iter()
            .filter_map(|outcome| match outcome {
                LoadOutcome::Failed { banner } => Some(banner.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub struct Dashboard {
    api: Arc<InventoryApi>,
    catalog: ListCache<ProductCatalog>,
    owner_products: ListCache<ProductCatalog>,
    owners: ListCache<OwnerDirectory>,
    stock_ins: ListCache<StockLedger>,
    stock_outs: ListCache<StockLedger>,
    threshold: u32,
}

impl Dashboard {
    pub fn new(api: Arc<InventoryApi>, threshold: u32) -> Self {
        Self {
            catalog: ListCache::new(ProductCatalog::new(api.clone()), ProductScope::All),
            owner_products: ListCache::new(ProductCatalog::new(api.clone()), ProductScope::All),
            owners: ListCache::new(OwnerDirectory::new(api.clone()), ()),
            stock_ins: ListCache::new(StockLedger::new(api.clone()), Direction::In),
            stock_outs: ListCache::new(StockLedger::new(api.clone()), Direction::Out),
            api,
            threshold,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api = Arc::new(InventoryApi::new(config)?);
        Ok(Self::new(api, config.low_stock_threshold))
    }

    pub fn catalog(&self) -> &ListCache<ProductCatalog> {
        &self.catalog
    }

    pub fn owner_products(&self) -> &ListCache<ProductCatalog> {
        &self.owner_products
    }

    pub fn owners(&self) -> &ListCache<OwnerDirectory> {
        &self.owners
    }

    pub fn ledger(&self, direction: Direction) -> &ListCache<StockLedger> {
        match direction {
            Direction::In => &self.stock_ins,
            Direction::Out => &self.stock_outs,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Load the catalog, owners and both ledgers concurrently.
    pub async fn refresh_all(&self) -> RefreshReport {
        let (products, owners, stock_ins, stock_outs) = tokio::join!(
            self.catalog.load(),
            self.owners.load(),
            self.stock_ins.load(),
            self.stock_outs.load(),
        );
        RefreshReport {
            products,
            owners,
            stock_ins,
            stock_outs,
        }
    }

    /// Home-screen counts from the cached lists.
    pub async fn summary(&self) -> StockSummary {
        let products = self.catalog.items().await;
        StockSummary::compute(
            &products,
            self.stock_ins.len().await,
            self.stock_outs.len().await,
            self.threshold,
        )
    }

    /// Cached products below the configured threshold.
    pub async fn low_stock(&self) -> Vec<Product> {
        self.catalog.low_stock(self.threshold).await
    }

    /// Show the products of one owner, superseding any owner view still
    /// loading.
    pub async fn view_owner(&self, owner_id: impl Into<EntityId>) -> LoadOutcome {
        self.owner_products
            .load_scope(ProductScope::ByOwner(owner_id.into()))
            .await
    }

    /// Fetch a single product for its detail or edit screen.
    pub async fn product_details(&self, id: &str) -> Result<Product, ApiError> {
        self.api.product(id).await
    }

    /// Write to the catalog, then refresh the owner view if one is open.
    pub async fn mutate_product(
        &self,
        mutation: &Mutation<ProductDraft>,
    ) -> Result<LoadOutcome, CacheError> {
        let outcome = self.catalog.mutate(mutation).await?;
        if matches!(self.owner_products.scope().await, ProductScope::ByOwner(_)) {
            self.owner_products.load().await;
        }
        Ok(outcome)
    }

    /// Record a stock in or out, then reload the catalog so the new item
    /// count is visible.
    ///
    /// Returns the ledger's reload outcome.
    pub async fn record_stock(&self, draft: StockMovementDraft) -> Result<LoadOutcome, CacheError> {
        let ledger = self.ledger(draft.direction);
        let outcome = ledger.mutate(&Mutation::Create(draft)).await?;
        self.catalog.load().await;
        Ok(outcome)
    }
}
