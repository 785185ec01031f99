//! Puppy and pet shop listings.
//!
//! # Architecture
//!
//! - Raw records come from a [`RecordStore`]; [`projection`] turns them into
//!   view types and [`linker`] attaches each puppy's shop
//! - Two [`ListingCache`]s hold the computed listings: puppies (fetched
//!   together with shops for linking) and shops
//! - Lookups by id scan the cached listing first and fall back to a direct
//!   fetch, so records outside the listing filter still resolve
//!
//! # Example
//!
//! ```rust,ignore
//! use pup_market_storefront::catalog::Catalog;
//!
//! let catalog = Catalog::new(store, &config.catalog);
//! let puppies = catalog.puppies().await?;
//! ```

pub mod cache;
pub mod linker;
pub mod projection;
pub mod views;

pub use cache::{Clock, ListingCache, SystemClock};
pub use projection::{FieldMapping, ImageTransform, Projector};
pub use views::{PuppySummary, PuppyView, ShopDetail, ShopView};

use std::sync::Arc;

use pup_market_core::{PuppyId, ShopId};
use tracing::instrument;

use crate::airtable::{AirtableError, ListQuery, RecordStore};
use crate::config::CatalogConfig;

/// Listing service shared by the HTTP handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    store: Arc<dyn RecordStore>,
    config: CatalogConfig,
    projector: Projector,
    puppies: ListingCache<Vec<PuppyView>>,
    shops: ListingCache<Vec<ShopView>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create a catalog backed by `store` using the wall clock.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: &CatalogConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a catalog whose caches read time from `clock`.
    #[must_use]
    pub fn with_clock(
        store: Arc<dyn RecordStore>,
        config: &CatalogConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let projector = Projector::new(ImageTransform::new(
            config.cdn_transformation.as_str(),
            config.cdn_cloud_name.clone(),
        ));

        Self {
            inner: Arc::new(CatalogInner {
                store,
                config: config.clone(),
                projector,
                puppies: ListingCache::new(config.cache_ttl, Arc::clone(&clock)),
                shops: ListingCache::new(config.cache_ttl, clock),
            }),
        }
    }

    /// The record store this catalog reads from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// All listed puppies, each linked to its shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is stale and the refresh fails.
    pub async fn puppies(&self) -> Result<Arc<Vec<PuppyView>>, AirtableError> {
        self.inner
            .puppies
            .get_or_refresh(|| self.fetch_puppy_listing())
            .await
    }

    /// All pet shops.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing is stale and the refresh fails.
    pub async fn shops(&self) -> Result<Arc<Vec<ShopView>>, AirtableError> {
        self.inner
            .shops
            .get_or_refresh(|| self.fetch_shop_listing())
            .await
    }

    /// A single puppy, or `None` if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store cannot be reached.
    #[instrument(skip(self), fields(puppy_id = %id))]
    pub async fn puppy(&self, id: &PuppyId) -> Result<Option<PuppyView>, AirtableError> {
        let listing = self.puppies().await?;
        if let Some(puppy) = listing.iter().find(|puppy| &puppy.id == id) {
            return Ok(Some(puppy.clone()));
        }

        let Some(record) = self
            .inner
            .store
            .find(&self.inner.config.puppies_table, id.as_str())
            .await?
        else {
            return Ok(None);
        };

        let mut puppy = self.inner.projector.puppy(&record);
        match self.shops().await {
            Ok(shops) => linker::ShopIndex::new(&shops).link(&mut puppy),
            Err(e) => tracing::warn!(error = %e, "Shop listing unavailable, puppy left unlinked"),
        }

        Ok(Some(puppy))
    }

    /// A single shop with the puppies it lists, or `None` if no such record
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store cannot be reached.
    #[instrument(skip(self), fields(shop_id = %id))]
    pub async fn shop(&self, id: &ShopId) -> Result<Option<ShopDetail>, AirtableError> {
        let listing = self.shops().await?;
        let shop = match listing.iter().find(|shop| &shop.id == id) {
            Some(shop) => shop.clone(),
            None => match self
                .inner
                .store
                .find(&self.inner.config.shops_table, id.as_str())
                .await?
            {
                Some(record) => self.inner.projector.shop(&record),
                None => return Ok(None),
            },
        };

        let puppies = self.puppies().await?;

        Ok(Some(ShopDetail {
            puppies: linker::puppies_for_shop(&puppies, &shop.id),
            shop,
        }))
    }

    /// Drop both cached listings.
    pub async fn invalidate(&self) {
        self.inner.puppies.invalidate().await;
        self.inner.shops.invalidate().await;
    }

    #[instrument(skip(self))]
    async fn fetch_puppy_listing(&self) -> Result<Vec<PuppyView>, AirtableError> {
        let config = &self.inner.config;
        let puppy_query = ListQuery {
            filter_by_formula: config.puppy_filter.clone(),
            view: None,
        };
        let shop_query = self.shop_query();

        let (puppy_records, shop_records) = tokio::try_join!(
            self.inner.store.list(&config.puppies_table, &puppy_query),
            self.inner.store.list(&config.shops_table, &shop_query),
        )?;

        let projector = &self.inner.projector;
        let shops: Vec<ShopView> = shop_records.iter().map(|r| projector.shop(r)).collect();
        let puppies: Vec<PuppyView> = puppy_records.iter().map(|r| projector.puppy(r)).collect();

        tracing::info!(
            puppies = puppies.len(),
            shops = shops.len(),
            "Refreshed puppy listing"
        );

        Ok(linker::link_shops(puppies, &shops))
    }

    #[instrument(skip(self))]
    async fn fetch_shop_listing(&self) -> Result<Vec<ShopView>, AirtableError> {
        let records = self
            .inner
            .store
            .list(&self.inner.config.shops_table, &self.shop_query())
            .await?;

        let projector = &self.inner.projector;
        let shops: Vec<ShopView> = records.iter().map(|r| projector.shop(r)).collect();

        tracing::info!(shops = shops.len(), "Refreshed shop listing");

        Ok(shops)
    }

    fn shop_query(&self) -> ListQuery {
        ListQuery::all().with_view(self.inner.config.shops_view.clone())
    }
}
