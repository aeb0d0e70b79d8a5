use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

/// A deferred fetch of one resource from one source.
pub type SourceFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<T>> + Send>;

/// What to load and where it may come from.
pub struct ResourceRequest<T> {
    pub(crate) resource: String,
    pub(crate) remote: Option<SourceFn<T>>,
    pub(crate) fallback: Option<SourceFn<T>>,
}

impl<T> ResourceRequest<T> {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            remote: None,
            fallback: None,
        }
    }

    /// Set the remote fetch, tried first when the options allow it.
    pub fn remote<F, Fut>(mut self, fetch: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.remote = Some(Box::new(move || fetch().boxed()));
        self
    }

    /// Set the fallback supplier, used when the remote is skipped or fails.
    pub fn fallback<F, Fut>(mut self, supply: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.fallback = Some(Box::new(move || supply().boxed()));
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl<T> std::fmt::Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRequest")
            .field("resource", &self.resource)
            .field("remote", &self.has_remote())
            .field("fallback", &self.has_fallback())
            .finish()
    }
}
