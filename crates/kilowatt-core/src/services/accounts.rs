//! Accounts and their ESIIDs.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::models::{Account, AccountDraft, Esiid, Resource};

use super::{DataServices, ListParams, ServiceError};

pub struct AccountsService<'a> {
    services: &'a DataServices,
}

impl<'a> AccountsService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self, params: &ListParams) -> Result<Arc<Vec<Account>>, ServiceError> {
        self.services.load_list(Resource::Accounts, params).await
    }

    pub async fn by_id(&self, id: i64) -> Result<Account, ServiceError> {
        self.services.find_by_id(Resource::Accounts, id).await
    }

    pub async fn create(&self, draft: &AccountDraft) -> Result<Account, ServiceError> {
        self.services.require_backend("Account creation")?;
        let account: Account = self
            .services
            .api()
            .post_json(Resource::Accounts.endpoint(), draft)
            .await
            .map_err(ServiceError::Backend)?;
        self.services.invalidate_resource(Resource::Accounts);
        info!(id = account.id, "Account created");
        Ok(account)
    }

    pub async fn update(&self, id: i64, draft: &AccountDraft) -> Result<Account, ServiceError> {
        self.services.require_backend("Account updates")?;
        let account: Account = self
            .services
            .api()
            .put_json(&Resource::Accounts.item_endpoint(id), draft)
            .await
            .map_err(ServiceError::Backend)?;
        self.services.invalidate_resource(Resource::Accounts);
        Ok(account)
    }

    /// Ask the backend to pull fresh usage for the account's meters.
    pub async fn refresh_usage(&self, id: i64) -> Result<Value, ServiceError> {
        self.services.require_backend("Usage refresh")?;
        let path = format!("{}/refresh-usage", Resource::Accounts.item_endpoint(id));
        self.post_action(&path).await
    }

    pub async fn generate_pricing(&self, id: i64) -> Result<Value, ServiceError> {
        self.services.require_backend("Pricing generation")?;
        let path = format!("{}/generate-pricing", Resource::Accounts.item_endpoint(id));
        let result = self.post_action(&path).await?;
        // New quotes land in the pricing table
        self.services.invalidate_resource(Resource::Pricing);
        Ok(result)
    }

    async fn post_action(&self, path: &str) -> Result<Value, ServiceError> {
        let result: Value = self
            .services
            .api()
            .post_json(path, &serde_json::json!({}))
            .await
            .map_err(ServiceError::Backend)?;
        self.services.invalidate_resource(Resource::Accounts);
        Ok(result)
    }
}

pub struct EsiidsService<'a> {
    services: &'a DataServices,
}

impl<'a> EsiidsService<'a> {
    pub(crate) fn new(services: &'a DataServices) -> Self {
        Self { services }
    }

    pub async fn all(&self, params: &ListParams) -> Result<Arc<Vec<Esiid>>, ServiceError> {
        self.services.load_list(Resource::Esiids, params).await
    }

    pub async fn by_id(&self, id: i64) -> Result<Esiid, ServiceError> {
        self.services.find_by_id(Resource::Esiids, id).await
    }

    /// Service points on one account. The backend filters server-side;
    /// otherwise the full list is filtered here.
    pub async fn by_account(&self, account_id: i64) -> Result<Vec<Esiid>, ServiceError> {
        if self.services.config().use_backend_api {
            let query = [("account_id".to_string(), account_id.to_string())];
            match self
                .services
                .api()
                .fetch_list::<Vec<Esiid>>(Resource::Esiids, &query)
                .await
            {
                Ok(esiids) => return Ok(esiids),
                Err(e) => {
                    warn!(account_id, error = %format!("{:#}", e), "Backend API failed for account ESIIDs");
                }
            }
        }

        let all = self.all(&ListParams::new()).await?;
        Ok(all
            .iter()
            .filter(|e| e.account_id == Some(account_id))
            .cloned()
            .collect())
    }
}
