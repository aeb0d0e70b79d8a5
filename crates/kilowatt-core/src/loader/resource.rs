use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::cache::{CacheEntryInfo, CacheStore, Clock};

use super::error::{LoadError, SourceFailure};
use super::options::{DataSource, LoadOptions};
use super::request::{ResourceRequest, SourceFn};

/// A loaded value and the source that produced it.
#[derive(Debug)]
pub struct Loaded<T> {
    pub data: Arc<T>,
    pub source: DataSource,
}

type InFlightMap = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Cache-aside loader over a remote source and a static fallback.
///
/// Each loader owns its `CacheStore`. Loads for one resource try, in order,
/// a fresh cache entry, the remote fetch and the fallback supplier, and
/// cache whichever source succeeds first. Failures are never cached.
///
/// Overlapping loads of the same key each fetch independently unless
/// coalescing is enabled with [`ResourceLoader::with_coalescing`].
pub struct ResourceLoader {
    store: CacheStore,
    coalesce: bool,
    in_flight: InFlightMap,
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader {
    pub fn new() -> Self {
        Self::with_store(CacheStore::new())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_store(CacheStore::with_clock(clock))
    }

    pub fn with_store(store: CacheStore) -> Self {
        Self {
            store,
            coalesce: false,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Make concurrent loads of one key wait for the first fetch to finish
    /// and then re-check the cache.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub async fn load<T>(
        &self,
        request: ResourceRequest<T>,
        options: &LoadOptions,
    ) -> Result<Arc<T>, LoadError>
    where
        T: Send + Sync + 'static,
    {
        self.load_with_source(request, options)
            .await
            .map(|loaded| loaded.data)
    }

    pub async fn load_with_source<T>(
        &self,
        request: ResourceRequest<T>,
        options: &LoadOptions,
    ) -> Result<Loaded<T>, LoadError>
    where
        T: Send + Sync + 'static,
    {
        validate(&request, options)?;
        let ResourceRequest {
            resource,
            remote,
            fallback,
        } = request;

        if let Some(data) = self.cached(&resource, options) {
            return Ok(data);
        }

        let _in_flight = if self.coalesce {
            let guard = self.acquire(&resource).await;
            // Another caller may have filled the entry while we waited
            if let Some(data) = self.cached(&resource, options) {
                return Ok(data);
            }
            Some(guard)
        } else {
            None
        };

        let mut causes = Vec::new();

        if options.use_remote_first {
            if let Some(remote) = remote {
                match run_stage(remote, options.stage_timeout).await {
                    Ok(data) => return Ok(self.remember(&resource, data, DataSource::Remote, options)),
                    Err(e) => {
                        warn!(resource = %resource, error = %format!("{:#}", e), "Remote fetch failed");
                        causes.push(SourceFailure::RemoteFetchFailed(e));
                        if !options.allow_fallback_on_remote_failure {
                            return Err(LoadError::ResourceUnavailable { resource, causes });
                        }
                    }
                }
            }
        }

        let Some(fallback) = fallback else {
            return Err(LoadError::ResourceUnavailable { resource, causes });
        };

        match run_stage(fallback, options.stage_timeout).await {
            Ok(data) => Ok(self.remember(&resource, data, DataSource::Fallback, options)),
            Err(e) => {
                warn!(resource = %resource, error = %format!("{:#}", e), "Fallback failed");
                causes.push(SourceFailure::FallbackFailed(e));
                Err(LoadError::ResourceUnavailable { resource, causes })
            }
        }
    }

    /// Drop the entry for one resource. Returns whether one existed.
    pub fn invalidate(&self, resource: &str) -> bool {
        let removed = self.store.remove(resource);
        debug!(resource, removed, "Cache invalidated");
        removed
    }

    pub fn invalidate_all(&self) {
        self.store.clear();
        debug!("Cache cleared");
    }

    pub fn inspect(&self) -> Vec<CacheEntryInfo> {
        self.store.entries()
    }

    fn cached<T>(&self, resource: &str, options: &LoadOptions) -> Option<Loaded<T>>
    where
        T: Send + Sync + 'static,
    {
        let data = self.store.get_fresh::<T>(resource, options.ttl)?;
        debug!(resource, source = %DataSource::Cache, "Data loaded");
        Some(Loaded {
            data,
            source: DataSource::Cache,
        })
    }

    fn remember<T>(
        &self,
        resource: &str,
        data: T,
        source: DataSource,
        options: &LoadOptions,
    ) -> Loaded<T>
    where
        T: Send + Sync + 'static,
    {
        let data = Arc::new(data);
        if !options.ttl.is_zero() {
            self.store.put(resource, Arc::clone(&data));
        }
        debug!(resource, source = %source, "Data loaded");
        Loaded { data, source }
    }

    async fn acquire(&self, resource: &str) -> InFlight<'_> {
        let lock = {
            let mut map = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(resource.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        InFlight {
            map: &self.in_flight,
            key: resource.to_string(),
            guard: Some(guard),
        }
    }
}

fn validate<T>(request: &ResourceRequest<T>, options: &LoadOptions) -> Result<(), LoadError> {
    let resource = request.resource();
    if resource.trim().is_empty() {
        return Err(LoadError::invalid(resource, "resource name is empty"));
    }
    if !request.has_remote() && !request.has_fallback() {
        return Err(LoadError::invalid(
            resource,
            "neither a remote fetch nor a fallback supplier was provided",
        ));
    }
    if !request.has_fallback() && !options.use_remote_first {
        return Err(LoadError::invalid(
            resource,
            "remote fetch is disabled and no fallback supplier was provided",
        ));
    }
    Ok(())
}

async fn run_stage<T>(fetch: SourceFn<T>, timeout: Option<Duration>) -> anyhow::Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch())
            .await
            .map_err(|_| anyhow!("timed out after {}ms", limit.as_millis()))?,
        None => fetch().await,
    }
}

/// Holds the per-key lock while a coalesced fetch runs.
struct InFlight<'a> {
    map: &'a InFlightMap,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters hold their own clone, so a count of one means nobody is queued
        if map.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(&self.key);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use crate::cache::ManualClock;

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        id: i64,
        name: String,
    }

    fn sample() -> Vec<Account> {
        vec![Account {
            id: 1,
            name: "Sample".to_string(),
        }]
    }

    fn loader_at(start: i64) -> (Arc<ManualClock>, ResourceLoader) {
        let clock = Arc::new(ManualClock::new(start));
        let loader = ResourceLoader::with_clock(clock.clone());
        (clock, loader)
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    /// Remote fetch that counts calls and returns `result`.
    fn remote_source(
        calls: &Arc<AtomicUsize>,
        result: Result<Vec<Account>, &'static str>,
    ) -> impl FnOnce() -> BoxedResult + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { result.map_err(|e| anyhow!(e)) }.boxed()
        }
    }

    type BoxedResult = futures::future::BoxFuture<'static, anyhow::Result<Vec<Account>>>;

    fn request(
        remote_calls: &Arc<AtomicUsize>,
        remote: Result<Vec<Account>, &'static str>,
        fallback_calls: &Arc<AtomicUsize>,
        fallback: Result<Vec<Account>, &'static str>,
    ) -> ResourceRequest<Vec<Account>> {
        ResourceRequest::new("accounts")
            .remote(remote_source(remote_calls, remote))
            .fallback(remote_source(fallback_calls, fallback))
    }

    fn options() -> LoadOptions {
        LoadOptions::default().with_ttl(Duration::from_millis(5_000))
    }

    #[tokio::test]
    async fn test_fallback_after_remote_timeout_scenario() {
        let (clock, loader) = loader_at(1_700_000_000_000);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Err("network timeout"), &fallback_calls, Ok(sample()));
        let first = loader.load_with_source(req, &options()).await.unwrap();
        assert_eq!(*first.data, sample());
        assert_eq!(first.source, DataSource::Fallback);
        assert_eq!(remote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);

        let entries = loader.inspect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].resource, "accounts");
        assert_eq!(
            entries[0].stored_at.map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );

        // Two seconds later, still inside the TTL
        clock.advance(Duration::from_secs(2));
        let req = request(&remote_calls, Err("network timeout"), &fallback_calls, Ok(sample()));
        let second = loader.load_with_source(req, &options()).await.unwrap();
        assert_eq!(second.source, DataSource::Cache);
        assert!(Arc::ptr_eq(&first.data, &second.data));
        assert_eq!(remote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_io() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Ok(sample()), &fallback_calls, Ok(vec![]));
        let first = loader.load(req, &options()).await.unwrap();
        assert_eq!(remote_calls.load(Ordering::SeqCst), 1);

        let req = request(&remote_calls, Ok(vec![]), &fallback_calls, Ok(vec![]));
        let second = loader.load(req, &options()).await.unwrap();
        assert_eq!(*second, *first);
        assert_eq!(remote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let (clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Ok(sample()), &fallback_calls, Ok(vec![]));
        loader.load(req, &options()).await.unwrap();

        clock.advance(Duration::from_millis(5_001));
        let req = request(&remote_calls, Ok(vec![]), &fallback_calls, Ok(vec![]));
        let fresh = loader.load_with_source(req, &options()).await.unwrap();
        assert_eq!(fresh.source, DataSource::Remote);
        assert!(fresh.data.is_empty());
        assert_eq!(remote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();
        let opts = LoadOptions::default().with_ttl(Duration::ZERO);

        for _ in 0..3 {
            let req = request(&remote_calls, Ok(sample()), &fallback_calls, Ok(vec![]));
            loader.load(req, &opts).await.unwrap();
        }
        assert_eq!(remote_calls.load(Ordering::SeqCst), 3);
        assert!(loader.inspect().is_empty());
    }

    #[tokio::test]
    async fn test_remote_disabled_never_calls_remote() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();
        let req = ResourceRequest::new("managers")
            .remote(remote_source(&remote_calls, Err("remote must not be called")))
            .fallback(remote_source(&fallback_calls, Ok(sample())));

        let opts = options().remote_first(false);
        let loaded = loader.load_with_source(req, &opts).await.unwrap();
        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(remote_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_total_failure_aggregates_causes() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Err("502 bad gateway"), &fallback_calls, Err("fixture missing"));
        let err = loader.load(req, &options()).await.unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(err.resource(), "accounts");
        let causes = err.causes();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], SourceFailure::RemoteFetchFailed(_)));
        assert!(matches!(causes[1], SourceFailure::FallbackFailed(_)));
        assert_eq!(causes[0].error().to_string(), "502 bad gateway");
        assert_eq!(causes[1].error().to_string(), "fixture missing");
        assert!(loader.inspect().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_fatal_when_fallback_disallowed() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Err("connection refused"), &fallback_calls, Ok(sample()));
        let opts = options().fallback_on_remote_failure(false);
        let err = loader.load(req, &opts).await.unwrap_err();

        assert_eq!(err.causes().len(), 1);
        assert!(err.causes()[0].is_remote());
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert!(loader.inspect().is_empty());
    }

    #[tokio::test]
    async fn test_remote_only_failure_is_unavailable() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let req = ResourceRequest::new("pricing").remote(remote_source(&remote_calls, Err("down")));

        let err = loader.load(req, &options()).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(err.causes().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (_clock, loader) = loader_at(0);
        let remote_calls = counter();
        let fallback_calls = counter();

        let req = request(&remote_calls, Ok(sample()), &fallback_calls, Ok(vec![]));
        loader.load(req, &options()).await.unwrap();

        assert!(loader.invalidate("accounts"));
        assert!(!loader.invalidate("accounts"));

        let req = request(&remote_calls, Ok(sample()), &fallback_calls, Ok(vec![]));
        let loaded = loader.load_with_source(req, &options()).await.unwrap();
        assert_eq!(loaded.source, DataSource::Remote);
        assert_eq!(remote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_resource() {
        let (_clock, loader) = loader_at(0);
        for name in ["accounts", "esiids"] {
            let req = ResourceRequest::new(name).fallback(|| async { Ok(1u32) });
            loader.load(req, &options()).await.unwrap();
        }
        assert_eq!(loader.inspect().len(), 2);
        loader.invalidate_all();
        loader.invalidate_all();
        assert!(loader.inspect().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_configuration_fails_before_io() {
        let (_clock, loader) = loader_at(0);

        let req: ResourceRequest<u32> = ResourceRequest::new("accounts");
        let err = loader.load(req, &options()).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfiguration { .. }));

        let req = ResourceRequest::new("  ").fallback(|| async { Ok(1u32) });
        let err = loader.load(req, &options()).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfiguration { .. }));

        let calls = counter();
        let req = ResourceRequest::new("accounts").remote(remote_source(&calls, Ok(sample())));
        let err = loader.load(req, &options().remote_first(false)).await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfiguration { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached_not_an_error() {
        let (_clock, loader) = loader_at(0);
        let req = ResourceRequest::new("commissions").fallback(|| async { Ok(Vec::<u32>::new()) });
        let data = loader.load(req, &options()).await.unwrap();
        assert!(data.is_empty());
        assert!(loader.store().contains("commissions"));
    }

    #[tokio::test]
    async fn test_stage_timeout_falls_through() {
        let (_clock, loader) = loader_at(0);
        let req = ResourceRequest::new("providers")
            .remote(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![0u8])
            })
            .fallback(|| async { Ok(vec![7u8]) });

        let opts = options().with_stage_timeout(Duration::from_millis(20));
        let loaded = loader.load_with_source(req, &opts).await.unwrap();
        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(*loaded.data, vec![7u8]);
    }

    #[tokio::test]
    async fn test_overlapping_loads_fetch_twice_without_coalescing() {
        let (_clock, loader) = loader_at(0);
        let calls = counter();
        let slow = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            ResourceRequest::new("accounts").fallback(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(1u32)
            })
        };

        let opts = options();
        let (a, b) = futures::future::join(
            loader.load(slow(&calls), &opts),
            loader.load(slow(&calls), &opts),
        )
        .await;
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_coalescing_shares_one_fetch() {
        let clock = Arc::new(ManualClock::new(0));
        let loader = ResourceLoader::with_clock(clock).with_coalescing(true);
        let calls = counter();
        let slow = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            ResourceRequest::new("accounts").fallback(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(1u32)
            })
        };

        let opts = options();
        let (a, b) = futures::future::join(
            loader.load(slow(&calls), &opts),
            loader.load(slow(&calls), &opts),
        )
        .await;
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let in_flight = loader.in_flight.lock().unwrap();
        assert!(in_flight.is_empty());
    }
}
