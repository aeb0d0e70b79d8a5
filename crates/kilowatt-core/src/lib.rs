//! Kilowatt core library.
//!
//! A cache-aside data layer for the Kilowatt energy-brokerage dashboard.
//! Each resource is served from an in-memory TTL cache, then from the REST
//! backend, then from static JSON fixtures.
//!
//! - `loader`: the `ResourceLoader` and its load policy
//! - `cache`: the timestamped entry store and its clock
//! - `api`: HTTP client for `/api/v1/...`
//! - `fixtures`: bundled or on-disk fallback documents
//! - `models`: typed records for each resource
//! - `services`: per-resource operations wired from `DataConfig`

pub mod api;
pub mod cache;
pub mod config;
pub mod fixtures;
pub mod loader;
pub mod models;
pub mod services;

pub use config::DataConfig;
pub use loader::{DataSource, LoadError, LoadOptions, Loaded, ResourceLoader, ResourceRequest};
pub use models::Resource;
pub use services::{DataServices, ListParams, ServiceError};
