//! Cache-aside resource loading with a static fallback.
//!
//! A `ResourceLoader` resolves a named resource from, in order, a fresh
//! cache entry, an optional remote fetch and a fallback supplier. The
//! first source that succeeds is cached; failures never are.
//!
//! ```ignore
//! let request = ResourceRequest::new("accounts")
//!     .remote(move || async move { api.get_json("/api/v1/accounts", &[]).await })
//!     .fallback(move || async move { fixtures.load(Resource::Accounts).await });
//! let accounts: Arc<Vec<Account>> = loader.load(request, &options).await?;
//! ```

pub mod error;
pub mod options;
pub mod request;
pub mod resource;

pub use error::{LoadError, SourceFailure};
pub use options::{DataSource, LoadOptions, DEFAULT_TTL};
pub use request::{ResourceRequest, SourceFn};
pub use resource::{Loaded, ResourceLoader};
