//! Application state shared across handlers.

use std::sync::Arc;

use crate::airtable::{AirtableClient, AirtableError, RecordStore};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the record store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
}

impl AppState {
    /// Create application state backed by the Airtable REST API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AirtableError> {
        let client = AirtableClient::new(&config.airtable)?;
        Ok(Self::with_store(config, Arc::new(client)))
    }

    /// Create application state backed by any record store.
    #[must_use]
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn RecordStore>) -> Self {
        Self::with_catalog(Catalog::new(store, &config.catalog), config)
    }

    /// Create application state around an existing catalog.
    #[must_use]
    pub fn with_catalog(catalog: Catalog, config: StorefrontConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalog }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the listing catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.inner.catalog.store().as_ref()
    }
}
