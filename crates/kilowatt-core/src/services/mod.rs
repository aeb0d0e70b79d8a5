//! Resource services built on the loader.
//!
//! `DataServices` wires the API client (remote source), the fixture source
//! (fallback) and a `ResourceLoader` together according to `DataConfig`.
//! Per-resource views such as `accounts()` or `pricing()` borrow it.

pub mod accounts;
pub mod directory;
pub mod finance;
pub mod status;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cache::CacheEntryInfo;
use crate::config::DataConfig;
use crate::fixtures::FixtureSource;
use crate::loader::{DataSource, LoadError, LoadOptions, Loaded, ResourceLoader, ResourceRequest};
use crate::models::{
    Account, AnalyticsResults, Commission, Esiid, Identified, ManagementCompany, Manager,
    PricingRecord, Provider, Resource,
};

pub use accounts::{AccountsService, EsiidsService};
pub use directory::{CompaniesService, ManagersService, ProvidersService};
pub use finance::{CommissionsService, PricingService};
pub use status::{AnalyticsService, HealthService};

/// Query parameters for list endpoints. Ordered so cache keys are canonical.
pub type ListParams = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{resource} with ID {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error("{0} requires backend API")]
    BackendRequired(&'static str),

    #[error("Backend request failed: {0:#}")]
    Backend(anyhow::Error),
}

/// Snapshot of the loader cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    pub entries: Vec<CacheEntryInfo>,
}

/// Cache key for a resource queried with `params`.
pub fn cache_key(resource: Resource, params: &ListParams) -> String {
    if params.is_empty() {
        return resource.key().to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", resource.key(), query)
}

pub struct DataServices {
    config: DataConfig,
    api: ApiClient,
    fixtures: FixtureSource,
    loader: ResourceLoader,
    options: LoadOptions,
}

impl DataServices {
    pub fn new(config: DataConfig) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        let fixtures = FixtureSource::from_dir(config.fixture_dir.clone());
        let loader = ResourceLoader::new().with_coalescing(config.coalesce_requests);
        Ok(Self::with_parts(config, api, fixtures, loader))
    }

    pub fn with_parts(
        config: DataConfig,
        api: ApiClient,
        fixtures: FixtureSource,
        loader: ResourceLoader,
    ) -> Self {
        let options = LoadOptions::from_config(&config);
        info!(
            backend = config.use_backend_api,
            api_url = %config.api_base_url,
            fixtures = ?fixtures,
            "Data services configured"
        );
        Self {
            config,
            api,
            fixtures,
            loader,
            options,
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    // ===== Resource Views =====

    pub fn accounts(&self) -> AccountsService<'_> {
        AccountsService::new(self)
    }

    pub fn esiids(&self) -> EsiidsService<'_> {
        EsiidsService::new(self)
    }

    pub fn managers(&self) -> ManagersService<'_> {
        ManagersService::new(self)
    }

    pub fn companies(&self) -> CompaniesService<'_> {
        CompaniesService::new(self)
    }

    pub fn providers(&self) -> ProvidersService<'_> {
        ProvidersService::new(self)
    }

    pub fn commissions(&self) -> CommissionsService<'_> {
        CommissionsService::new(self)
    }

    pub fn pricing(&self) -> PricingService<'_> {
        PricingService::new(self)
    }

    pub fn analytics(&self) -> AnalyticsService<'_> {
        AnalyticsService::new(self)
    }

    pub fn health(&self) -> HealthService<'_> {
        HealthService::new(self)
    }

    // ===== Cache Management =====

    pub fn clear_cache(&self) {
        self.loader.invalidate_all();
        info!("Data cache cleared");
    }

    pub fn clear_cache_key(&self, key: &str) -> bool {
        let removed = self.loader.invalidate(key);
        info!(key, removed, "Cache cleared for key");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        let entries = self.loader.inspect();
        CacheStats {
            size: entries.len(),
            keys: entries.iter().map(|e| e.resource.clone()).collect(),
            entries,
        }
    }

    /// Drop every cached query of `resource`, filtered or not.
    pub fn invalidate_resource(&self, resource: Resource) {
        let prefix = format!("{}?", resource.key());
        for key in self.loader.store().keys() {
            if key == resource.key() || key.starts_with(&prefix) {
                self.loader.invalidate(&key);
            }
        }
    }

    /// Load and cache every resource concurrently, typed as its service reads it.
    pub async fn preload(&self) -> Vec<(Resource, Result<DataSource, LoadError>)> {
        let loads = Resource::ALL.into_iter().map(|resource| async move {
            (resource, self.preload_one(resource).await)
        });
        futures::future::join_all(loads).await
    }

    async fn preload_one(&self, resource: Resource) -> Result<DataSource, LoadError> {
        let params = ListParams::new();
        let source = match resource {
            Resource::Accounts => self.load_resource::<Vec<Account>>(resource, &params).await?.source,
            Resource::Esiids => self.load_resource::<Vec<Esiid>>(resource, &params).await?.source,
            Resource::Managers => self.load_resource::<Vec<Manager>>(resource, &params).await?.source,
            Resource::Companies => self.load_resource::<Vec<ManagementCompany>>(resource, &params).await?.source,
            Resource::Commissions => self.load_resource::<Vec<Commission>>(resource, &params).await?.source,
            Resource::Providers => self.load_resource::<Vec<Provider>>(resource, &params).await?.source,
            Resource::Pricing => self.load_resource::<Vec<PricingRecord>>(resource, &params).await?.source,
            Resource::Analytics => self.load_resource::<AnalyticsResults>(resource, &params).await?.source,
        };
        Ok(source)
    }

    // ===== Shared Helpers =====

    /// Load a whole resource document through the cache, remote and fallback,
    /// reporting which of the three served it.
    pub async fn load_resource<T>(
        &self,
        resource: Resource,
        params: &ListParams,
    ) -> Result<Loaded<T>, LoadError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let api = self.api.clone();
        let fixtures = self.fixtures.clone();
        let query: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let filter = query.clone();

        let request = ResourceRequest::new(cache_key(resource, params))
            .remote(move || async move { api.fetch_list::<T>(resource, &query).await })
            .fallback(move || async move { fixtures.load_filtered::<T>(resource, &filter).await });

        self.loader.load_with_source(request, &self.options).await
    }

    pub(crate) async fn load_list<T>(
        &self,
        resource: Resource,
        params: &ListParams,
    ) -> Result<Arc<Vec<T>>, ServiceError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Ok(self.load_resource::<Vec<T>>(resource, params).await?.data)
    }

    /// Fetch one record: from the item endpoint when the backend is enabled,
    /// otherwise (or on failure) from the unfiltered cached list.
    pub(crate) async fn find_by_id<T>(&self, resource: Resource, id: i64) -> Result<T, ServiceError>
    where
        T: Identified + Clone + DeserializeOwned + Send + Sync + 'static,
    {
        if self.config.use_backend_api {
            match self.api.fetch_item::<T>(resource, id).await {
                Ok(item) => return Ok(item),
                Err(e) => {
                    warn!(resource = %resource, id, error = %format!("{:#}", e), "Backend API failed for item details, using cached data");
                }
            }
        }

        let all = self.load_list::<T>(resource, &ListParams::new()).await?;
        all.iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(ServiceError::NotFound { resource, id })
    }

    pub(crate) fn require_backend(&self, operation: &'static str) -> Result<(), ServiceError> {
        if self.config.use_backend_api {
            Ok(())
        } else {
            Err(ServiceError::BackendRequired(operation))
        }
    }
}
