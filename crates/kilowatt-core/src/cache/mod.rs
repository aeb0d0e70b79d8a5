//! In-memory caching module for loaded resources.
//!
//! This module provides the `CacheStore` used by the resource loader.
//! Entries are keyed by resource name and considered fresh for a
//! configurable time-to-live (five minutes by default).
//!
//! Time is read through the `Clock` trait so tests can drive expiry
//! deterministically with `ManualClock`.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntryInfo, CacheStore, CachedData};
