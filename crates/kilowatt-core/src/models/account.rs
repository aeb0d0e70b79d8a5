//! Customer accounts and their metered service points.

use serde::{Deserialize, Serialize};

use super::de::{deserialize_number_or_string, deserialize_string_or_number};
use super::Identified;

/// A customer account.
///
/// Fixtures use camelCase keys while the backend returns snake_case, so every
/// multi-word field accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    #[serde(default, alias = "account_name")]
    pub account_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "manager_name")]
    pub manager_name: Option<String>,
    #[serde(default, alias = "manager_id")]
    pub manager_id: Option<i64>,
    #[serde(default, alias = "management_company")]
    pub management_company: Option<String>,
    #[serde(default, alias = "procurement_status")]
    pub procurement_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub status: Option<String>,
    #[serde(default, alias = "contact_name")]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default, alias = "billing_city")]
    pub billing_city: Option<String>,
    #[serde(default, alias = "billing_state")]
    pub billing_state: Option<String>,
    #[serde(default, alias = "customer_type")]
    pub customer_type: Option<String>,
    #[serde(default, alias = "usage_kwh", deserialize_with = "deserialize_number_or_string")]
    pub usage_kwh: Option<f64>,
    #[serde(default, alias = "load_profile")]
    pub load_profile: Option<String>,
    #[serde(default, alias = "zone_account")]
    pub zone_account: Option<String>,
    #[serde(default, alias = "provider_id")]
    pub provider_id: Option<i64>,
}

impl Account {
    /// Display name, preferring the account name over the short name.
    pub fn display_name(&self) -> &str {
        self.account_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
            .unwrap_or("Unnamed account")
    }
}

impl Identified for Account {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Fields accepted when creating or updating an account on the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procurement_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
}
