use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};

type ErasedData = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub stored_at_millis: i64,
}

impl<T> CachedData<T> {
    pub fn new(data: T, stored_at_millis: i64) -> Self {
        Self {
            data,
            stored_at_millis,
        }
    }

    /// Age in milliseconds, clamped at zero when the clock moved backwards.
    pub fn age_millis(&self, now_millis: i64) -> u64 {
        u64::try_from(now_millis - self.stored_at_millis).unwrap_or(0)
    }

    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        u128::from(self.age_millis(now_millis)) < ttl.as_millis()
    }

    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.stored_at_millis)
    }

    pub fn age_display(&self, now_millis: i64) -> String {
        let seconds = self.age_millis(now_millis) / 1000;
        let minutes = seconds / 60;
        if seconds < 1 {
            "just now".to_string()
        } else if seconds < 60 {
            format!("{}s ago", seconds)
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Diagnostic view of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryInfo {
    pub resource: String,
    pub stored_at: Option<DateTime<Utc>>,
    pub age: Duration,
    pub age_display: String,
}

/// Process-wide map from resource name to its most recent successful result.
///
/// Values are type-erased so a single store can hold every resource type.
/// A lookup with a type other than the one stored is reported as a miss.
pub struct CacheStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CachedData<ErasedData>>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.len())
            .finish()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedData<ErasedData>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the entry for `name` if it is younger than `ttl`.
    ///
    /// A zero `ttl` never hits.
    pub fn get_fresh<T>(&self, name: &str, ttl: Duration) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        if ttl.is_zero() {
            return None;
        }
        let now = self.now_millis();
        let entries = self.lock();
        let cached = entries.get(name)?;
        if !cached.is_fresh(now, ttl) {
            debug!(resource = name, age_ms = cached.age_millis(now), "Cache entry expired");
            return None;
        }
        match Arc::clone(&cached.data).downcast::<T>() {
            Ok(data) => Some(data),
            Err(_) => {
                warn!(
                    resource = name,
                    expected = std::any::type_name::<T>(),
                    "Cached entry has a different type, treating as miss"
                );
                None
            }
        }
    }

    /// Store `data` for `name`, replacing any previous entry.
    pub fn put<T>(&self, name: &str, data: Arc<T>)
    where
        T: Send + Sync + 'static,
    {
        let cached = CachedData::new(data as ErasedData, self.now_millis());
        self.lock().insert(name.to_string(), cached);
    }

    /// Remove the entry for `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> bool {
        self.lock().remove(name).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Names and ages of every entry, expired ones included, sorted by name.
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let now = self.now_millis();
        let mut infos: Vec<CacheEntryInfo> = self
            .lock()
            .iter()
            .map(|(name, cached)| CacheEntryInfo {
                resource: name.clone(),
                stored_at: cached.cached_at(),
                age: Duration::from_millis(cached.age_millis(now)),
                age_display: cached.age_display(now),
            })
            .collect();
        infos.sort_by(|a, b| a.resource.cmp(&b.resource));
        infos
    }
}

// ============================================================================
// Tests
// ============================================================================
