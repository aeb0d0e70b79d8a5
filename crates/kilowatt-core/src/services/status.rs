//! Analytics results and backend health.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{AnalyticsResults, Resource, SystemHealth};

use super::{DataServices, ListParams, ServiceError};

pub struct AnalyticsService<'a> {
    services: &'a DataServices,
}

impl<'a> AnalyticsService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn results(&self) -> Result<Arc<AnalyticsResults>, ServiceError> {
        let loaded = self
            .services
            .load_resource::<AnalyticsResults>(Resource::Analytics, &ListParams::new())
            .await?;
        Ok(loaded.data)
    }

    /// Start an analysis job. Cached results are dropped so the next
    /// `results()` sees the new output.
    pub async fn run(&self, analysis_type: &str) -> Result<AnalyticsResults, ServiceError> {
        self.services.require_backend("Running analysis")?;
        let output = self
            .services
            .api()
            .run_analysis(analysis_type)
            .await
            .map_err(ServiceError::Backend)?;
        self.services.invalidate_resource(Resource::Analytics);
        Ok(output)
    }
}

pub struct HealthService<'a> {
    services: &'a DataServices,
}

impl<'a> HealthService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    /// Whether the backend answers its health endpoint.
    pub async fn check_backend(&self) -> bool {
        match self.services.api().health().await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %format!("{:#}", e), "Backend health check failed");
                false
            }
        }
    }

    pub async fn system_health(&self) -> SystemHealth {
        if !self.services.config().use_backend_api {
            return SystemHealth::new("static", "Using static data mode");
        }

        match self.services.api().system_health().await {
            Ok(health) => health,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Backend system health unavailable");
                SystemHealth::new("error", "Backend unavailable")
            }
        }
    }
}
