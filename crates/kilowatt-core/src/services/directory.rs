//! Property managers, management companies and retail providers.

use std::sync::Arc;

use crate::models::{ManagementCompany, Manager, Provider, Resource};

use super::{DataServices, ListParams, ServiceError};

pub struct ManagersService<'a> {
    services: &'a DataServices,
}

impl<'a> ManagersService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self) -> Result<Arc<Vec<Manager>>, ServiceError> {
        self.services.load_list(Resource::Managers, &ListParams::new()).await
    }

    pub async fn by_id(&self, id: i64) -> Result<Manager, ServiceError> {
        self.services.find_by_id(Resource::Managers, id).await
    }
}

pub struct CompaniesService<'a> {
    services: &'a DataServices,
}

impl<'a> CompaniesService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self) -> Result<Arc<Vec<ManagementCompany>>, ServiceError> {
        self.services.load_list(Resource::Companies, &ListParams::new()).await
    }
}

pub struct ProvidersService<'a> {
    services: &'a DataServices,
}

impl<'a> ProvidersService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self) -> Result<Arc<Vec<Provider>>, ServiceError> {
        self.services.load_list(Resource::Providers, &ListParams::new()).await
    }

    /// Providers currently accepting enrollments.
    pub async fn active(&self) -> Result<Vec<Provider>, ServiceError> {
        let all = self.all().await?;
        Ok(all.iter().filter(|p| p.is_active()).cloned().collect())
    }
}
