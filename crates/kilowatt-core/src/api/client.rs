//! API client for communicating with the Kilowatt REST backend.
//!
//! This module provides the `ApiClient` struct for fetching account,
//! pricing, commission and provider data from `/api/v1/...` endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::config::DataConfig;
use crate::models::{AnalysisRequest, AnalyticsResults, Resource, SystemHealth};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const HEALTH_PATH: &str = "/api/v1/health";
const SYSTEM_HEALTH_PATH: &str = "/api/v1/health/system";
const ANALYTICS_RUN_PATH: &str = "/api/v1/analytics/run";

/// API client for the Kilowatt backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    initial_backoff: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    pub fn from_config(config: &DataConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_millis(config.api_timeout_ms),
        )
    }

    /// Override the rate-limit backoff (tests use a few milliseconds).
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(method, url, "Sending request");
            let response = build()
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    // ===== Generic Requests =====

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let url = self.url(path);
        self.send("GET", &url, || self.client.get(&url).query(query))
            .await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        self.send("POST", &url, || self.client.post(&url).json(body))
            .await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        self.send("PUT", &url, || self.client.put(&url).json(body))
            .await
    }

    // ===== Resource Endpoints =====

    /// Fetch a resource collection, optionally filtered by query parameters
    pub async fn fetch_list<T: DeserializeOwned>(&self, resource: Resource, params: &[(String, String)]) -> Result<T> {
        self.get_json(resource.endpoint(), params).await
    }

    /// Fetch one record of a resource by id
    pub async fn fetch_item<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T> {
        self.get_json(&resource.item_endpoint(id), &[]).await
    }

    pub async fn fetch_stats<T: DeserializeOwned>(&self, resource: Resource) -> Result<T> {
        self.get_json(&format!("{}/stats", resource.endpoint()), &[]).await
    }

    pub async fn run_analysis(&self, analysis_type: &str) -> Result<AnalyticsResults> {
        let body = AnalysisRequest {
            analysis_type: analysis_type.to_string(),
        };
        self.post_json(ANALYTICS_RUN_PATH, &body).await
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get_json(HEALTH_PATH, &[]).await
    }

    pub async fn system_health(&self) -> Result<SystemHealth> {
        self.get_json(SYSTEM_HEALTH_PATH, &[]).await
    }
}
