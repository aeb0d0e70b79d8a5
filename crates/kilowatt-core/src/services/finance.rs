//! Commissions and daily pricing, with their summary statistics.

use std::sync::Arc;

use tracing::warn;

use crate::models::{Commission, CommissionStats, PricingRecord, PricingStats, Resource};

use super::{DataServices, ListParams, ServiceError};

pub struct CommissionsService<'a> {
    services: &'a DataServices,
}

impl<'a> CommissionsService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self, params: &ListParams) -> Result<Arc<Vec<Commission>>, ServiceError> {
        self.services.load_list(Resource::Commissions, params).await
    }

    /// Backend stats when available, otherwise computed from the loaded list.
    pub async fn stats(&self) -> Result<CommissionStats, ServiceError> {
        if self.services.config().use_backend_api {
            match self.services.api().fetch_stats(Resource::Commissions).await {
                Ok(stats) => return Ok(stats),
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "Backend API failed for commission stats");
                }
            }
        }

        let commissions = self.all(&ListParams::new()).await?;
        Ok(CommissionStats::from_commissions(&commissions))
    }
}

pub struct PricingService<'a> {
    services: &'a DataServices,
}

impl<'a> PricingService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self, params: &ListParams) -> Result<Arc<Vec<PricingRecord>>, ServiceError> {
        self.services.load_list(Resource::Pricing, params).await
    }

    pub async fn stats(&self) -> Result<PricingStats, ServiceError> {
        if self.services.config().use_backend_api {
            match self.services.api().fetch_stats(Resource::Pricing).await {
                Ok(stats) => return Ok(stats),
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "Backend API failed for pricing stats");
                }
            }
        }

        let records = self.all(&ListParams::new()).await?;
        Ok(PricingStats::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use crate::services::testing::*;

    use super::*;

    #[tokio::test]
    async fn test_commission_stats_from_fixtures() {
        let services = static_services();
        let stats = services.commissions().stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert!((stats.total_amount - 1800.0).abs() < 1e-9);
        assert!((stats.average_amount - 600.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_pricing_stats_from_fixtures() {
        let services = static_services();
        let stats = services.pricing().stats().await.unwrap();
        assert_eq!(stats.total, 3);
        let expected = (0.0812 + 0.0845 + 0.0778) / 3.0;
        assert!((stats.average_price - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stats_computed_locally_when_backend_is_down() {
        let services = offline_backend(true);
        let stats = services.commissions().stats().await.unwrap();
        assert_eq!(stats.total, 3);
        // The list used for the computation is now cached
        assert_eq!(services.cache_stats().keys, vec!["commissions".to_string()]);
    }

    #[tokio::test]
    async fn test_stats_without_any_source_fail() {
        let services = offline_backend(false);
        let err = services.pricing().stats().await.unwrap_err();
        assert!(matches!(err, ServiceError::Load(_)));
        assert!(err.to_string().starts_with("Unable to load pricing data from any source"));
    }
}
