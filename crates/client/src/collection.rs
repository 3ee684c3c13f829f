//! Remote collections a [`ListCache`](crate::cache::ListCache) can mirror.
//!
//! A [`Collection`] knows how to read a whole list under some scope and
//! how to send a single write. It never caches anything itself.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use stockroom_core::owner::{Owner, OwnerDraft};
use stockroom_core::product::{Product, ProductDraft};
use stockroom_core::stock::{Direction, StockMovement, StockMovementDraft};
use stockroom_core::types::{Draft, EntityId};

use crate::api::InventoryApi;
use crate::error::ApiError;

/// A single write against a collection.
#[derive(Debug, Clone)]
pub enum Mutation<D> {
    Create(D),
    Update { id: EntityId, draft: D },
    Delete(EntityId),
}

impl<D> Mutation<D> {
    /// Operation name used in logs and `Unsupported` errors.
    pub fn operation(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete(_) => "delete",
        }
    }

    /// The form data carried by create and update.
    pub fn draft(&self) -> Option<&D> {
        match self {
            Mutation::Create(draft) | Mutation::Update { draft, .. } => Some(draft),
            Mutation::Delete(_) => None,
        }
    }

    /// The targeted entity for update and delete.
    pub fn target(&self) -> Option<&str> {
        match self {
            Mutation::Create(_) => None,
            Mutation::Update { id, .. } | Mutation::Delete(id) => Some(id.as_str()),
        }
    }
}

/// A remote list plus the writes that invalidate it.
#[async_trait]
pub trait Collection: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Draft: Draft + Send + Sync + 'static;
    /// Parameter the list is read under.
    type Scope: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Short name used in logs, e.g. `"products"`.
    const NAME: &'static str;

    /// Read the full list for `scope`.
    async fn fetch(&self, scope: &Self::Scope) -> Result<Vec<Self::Item>, ApiError>;

    /// Send one write. Operations without an endpoint fail with
    /// [`ApiError::Unsupported`] without touching the network.
    async fn apply(&self, mutation: &Mutation<Self::Draft>) -> Result<(), ApiError>;
}

fn unsupported<C: Collection>(mutation: &Mutation<C::Draft>) -> ApiError {
    ApiError::Unsupported {
        collection: C::NAME,
        operation: mutation.operation(),
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Which products a catalog cache shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductScope {
    #[default]
    All,
    ByOwner(EntityId),
}

pub struct ProductCatalog {
    api: Arc<InventoryApi>,
}

impl ProductCatalog {
    pub fn new(api: Arc<InventoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Collection for ProductCatalog {
    type Item = Product;
    type Draft = ProductDraft;
    type Scope = ProductScope;

    const NAME: &'static str = "products";

    async fn fetch(&self, scope: &ProductScope) -> Result<Vec<Product>, ApiError> {
        match scope {
            ProductScope::All => self.api.list_products().await,
            ProductScope::ByOwner(owner_id) => self.api.products_by_owner(owner_id).await,
        }
    }

    async fn apply(&self, mutation: &Mutation<ProductDraft>) -> Result<(), ApiError> {
        match mutation {
            Mutation::Create(draft) => self.api.create_product(draft).await,
            Mutation::Update { id, draft } => self.api.update_product(id, draft).await,
            Mutation::Delete(id) => self.api.delete_product(id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

pub struct OwnerDirectory {
    api: Arc<InventoryApi>,
}

impl OwnerDirectory {
    pub fn new(api: Arc<InventoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Collection for OwnerDirectory {
    type Item = Owner;
    type Draft = OwnerDraft;
    type Scope = ();

    const NAME: &'static str = "owners";

    async fn fetch(&self, _scope: &()) -> Result<Vec<Owner>, ApiError> {
        self.api.list_owners().await
    }

    async fn apply(&self, mutation: &Mutation<OwnerDraft>) -> Result<(), ApiError> {
        match mutation {
            Mutation::Create(draft) => self.api.create_owner(draft).await,
            Mutation::Delete(id) => self.api.delete_owner(id).await,
            Mutation::Update { .. } => Err(unsupported::<Self>(mutation)),
        }
    }
}

// ---------------------------------------------------------------------------
// Stock ledger
// ---------------------------------------------------------------------------

/// One side of the stock ledger, selected by the cache's [`Direction`] scope.
///
/// Ledger entries are append-only: only `Create` is accepted.
pub struct StockLedger {
    api: Arc<InventoryApi>,
}

impl StockLedger {
    pub fn new(api: Arc<InventoryApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Collection for StockLedger {
    type Item = StockMovement;
    type Draft = StockMovementDraft;
    type Scope = Direction;

    const NAME: &'static str = "stock";

    async fn fetch(&self, direction: &Direction) -> Result<Vec<StockMovement>, ApiError> {
        self.api.stock_movements(*direction).await
    }

    async fn apply(&self, mutation: &Mutation<StockMovementDraft>) -> Result<(), ApiError> {
        match mutation {
            Mutation::Create(draft) => self.api.record_stock(draft).await,
            Mutation::Update { .. } | Mutation::Delete(_) => Err(unsupported::<Self>(mutation)),
        }
    }
}
