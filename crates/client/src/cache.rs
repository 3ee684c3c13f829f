//! Read-through, write-invalidate cache for one remote list.
//!
//! [`ListCache`] holds the last successfully fetched array of a
//! [`Collection`]. Every successful write triggers a full reload; nothing
//! is patched locally, so server-computed fields (stock levels after a
//! stock movement, for instance) are always what the server says.
//!
//! Loads are tagged with a monotonically increasing generation. Starting a
//! load cancels the one in flight, and a response is applied only if its
//! generation is still the newest, so an out-of-order reply can never
//! overwrite fresher data.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use stockroom_core::low_stock::derive_low_stock;
use stockroom_core::product::Product;
use stockroom_core::search::{filter_items, Searchable};
use stockroom_core::types::{Draft, Identified};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::collection::{Collection, Mutation};
use crate::error::CacheError;

/// Load state of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A load is in flight, or none has completed yet.
    Loading,
    Loaded,
    /// The latest load failed; items are whatever was there before.
    Failed,
}

/// What happened to a call to [`ListCache::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched list replaced the cache.
    Applied { count: usize },
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
    /// The fetch failed; the banner now shows `banner`.
    Failed { banner: String },
}

/// A point-in-time copy of a cache's state.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T, S> {
    pub status: LoadStatus,
    pub items: Vec<T>,
    pub banner: Option<String>,
    pub scope: S,
}

struct ListState<T, S> {
    status: LoadStatus,
    items: Vec<T>,
    banner: Option<String>,
    scope: S,
    in_flight: Option<CancellationToken>,
}

/// In-memory mirror of a remote collection.
///
/// Share it as `Arc<ListCache<C>>`; all methods take `&self`.
pub struct ListCache<C: Collection> {
    source: C,
    state: RwLock<ListState<C::Item, C::Scope>>,
    generation: AtomicU64,
}

impl<C: Collection> ListCache<C> {
    /// Create an empty cache. Nothing is fetched until [`load`](Self::load).
    pub fn new(source: C, scope: C::Scope) -> Self {
        Self {
            source,
            state: RwLock::new(ListState {
                status: LoadStatus::Loading,
                items: Vec::new(),
                banner: None,
                scope,
                in_flight: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Reload the whole list in the current scope.
    pub async fn load(&self) -> LoadOutcome {
        self.run_load(None).await
    }

    /// Switch to `scope` and load it.
    ///
    /// When the scope actually changes the old items are dropped at once,
    /// so a view keyed by owner never shows another owner's products.
    pub async fn load_scope(&self, scope: C::Scope) -> LoadOutcome {
        self.run_load(Some(scope)).await
    }

    /// Send a write, then reload on success.
    ///
    /// Drafts are validated first; a validation failure returns before
    /// anything is sent and leaves the banner alone. A failed write sets
    /// the banner and leaves the cached items untouched.
    pub async fn mutate(&self, mutation: &Mutation<C::Draft>) -> Result<LoadOutcome, CacheError> {
        if let Some(draft) = mutation.draft() {
            draft.validate_on(today())?;
        }

        if let Err(e) = self.source.apply(mutation).await {
            tracing::warn!(
                collection = C::NAME,
                operation = mutation.operation(),
                target = ?mutation.target(),
                error = %e,
                "Mutation failed",
            );
            self.state.write().await.banner = Some(e.to_string());
            return Err(e.into());
        }

        tracing::info!(
            collection = C::NAME,
            operation = mutation.operation(),
            target = ?mutation.target(),
            "Mutation accepted, reloading",
        );

        Ok(self.load().await)
    }

    pub async fn snapshot(&self) -> ListSnapshot<C::Item, C::Scope> {
        let state = self.state.read().await;
        ListSnapshot {
            status: state.status,
            items: state.items.clone(),
            banner: state.banner.clone(),
            scope: state.scope.clone(),
        }
    }

    pub async fn items(&self) -> Vec<C::Item> {
        self.state.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn status(&self) -> LoadStatus {
        self.state.read().await.status
    }

    pub async fn scope(&self) -> C::Scope {
        self.state.read().await.scope.clone()
    }

    /// The user-visible error from the last failed load or write.
    pub async fn banner(&self) -> Option<String> {
        self.state.read().await.banner.clone()
    }

    pub async fn dismiss_banner(&self) {
        self.state.write().await.banner = None;
    }

    /// Items matching an arbitrary predicate, in list order.
    pub async fn filter_by<F>(&self, predicate: F) -> Vec<C::Item>
    where
        F: Fn(&C::Item) -> bool,
    {
        let state = self.state.read().await;
        state
            .items
            .iter()
            .filter(|item| predicate(*item))
            .cloned()
            .collect()
    }

    // ---- private helpers ----

    async fn run_load(&self, new_scope: Option<C::Scope>) -> LoadOutcome {
        let cancel = CancellationToken::new();

        // Generation and scope are taken under the write lock so that
        // generation order matches the order scopes were requested in.
        let (generation, scope) = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

            if let Some(previous) = state.in_flight.replace(cancel.clone()) {
                previous.cancel();
            }
            if let Some(scope) = new_scope {
                if scope != state.scope {
                    state.items.clear();
                    state.scope = scope;
                }
            }
            state.status = LoadStatus::Loading;
            (generation, state.scope.clone())
        };

        tracing::debug!(collection = C::NAME, generation, scope = ?scope, "Loading list");

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(collection = C::NAME, generation, "Load cancelled by a newer load");
                return LoadOutcome::Superseded;
            }
            result = self.source.fetch(&scope) => result,
        };

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(collection = C::NAME, generation, "Discarding stale response");
            return LoadOutcome::Superseded;
        }
        state.in_flight = None;

        match result {
            Ok(items) => {
                let count = items.len();
                state.items = items;
                state.status = LoadStatus::Loaded;
                state.banner = None;
                tracing::info!(collection = C::NAME, generation, count, "List loaded");
                LoadOutcome::Applied { count }
            }
            Err(e) => {
                let banner = e.to_string();
                state.status = LoadStatus::Failed;
                state.banner = Some(banner.clone());
                tracing::warn!(
                    collection = C::NAME,
                    generation,
                    error = %e,
                    kept = state.items.len(),
                    "List load failed",
                );
                LoadOutcome::Failed { banner }
            }
        }
    }
}

impl<C> ListCache<C>
where
    C: Collection,
    C::Item: Searchable,
{
    /// Case-insensitive substring search; a blank query returns everything.
    pub async fn filter(&self, query: &str) -> Vec<C::Item> {
        let state = self.state.read().await;
        filter_items(&state.items, query).into_iter().cloned().collect()
    }
}

impl<C> ListCache<C>
where
    C: Collection,
    C::Item: Identified,
{
    pub async fn find(&self, id: &str) -> Option<C::Item> {
        let state = self.state.read().await;
        state.items.iter().find(|item| item.id() == id).cloned()
    }
}

impl<C> ListCache<C>
where
    C: Collection<Item = Product>,
{
    /// Cached products whose item count is strictly below `threshold`.
    pub async fn low_stock(&self, threshold: u32) -> Vec<Product> {
        let state = self.state.read().await;
        derive_low_stock(&state.items, threshold)
            .into_iter()
            .cloned()
            .collect()
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
