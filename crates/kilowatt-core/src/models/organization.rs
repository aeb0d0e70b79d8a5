use serde::{Deserialize, Serialize};

use super::de::deserialize_string_or_number;
use super::Identified;

/// A property manager responsible for one or more accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "mgr_status", deserialize_with = "deserialize_string_or_number")]
    pub mgr_status: Option<String>,
    #[serde(default, alias = "management_company")]
    pub management_company: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default, alias = "office_city")]
    pub office_city: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cell: Option<String>,
}

impl Identified for Manager {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A management company employing managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementCompany {
    pub id: i64,
    #[serde(alias = "company_name")]
    pub company_name: String,
    #[serde(default, alias = "mgmt_co_code")]
    pub mgmt_co_code: Option<String>,
    #[serde(default, alias = "mgmt_status", deserialize_with = "deserialize_string_or_number")]
    pub mgmt_status: Option<String>,
    #[serde(default, alias = "office_city_state_zip")]
    pub office_city_state_zip: Option<String>,
    #[serde(default, alias = "office_phone")]
    pub office_phone: Option<String>,
    #[serde(default, alias = "billing_email")]
    pub billing_email: Option<String>,
}

impl Identified for ManagementCompany {
    fn id(&self) -> i64 {
        self.id
    }
}
