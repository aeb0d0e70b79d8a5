//! REST API client module for the Kilowatt backend.
//!
//! This module provides the `ApiClient` used as the remote source for
//! every resource. Responses are JSON; non-success statuses are mapped
//! to `ApiError`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
