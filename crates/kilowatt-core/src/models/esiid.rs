use serde::{Deserialize, Serialize};

use super::de::{deserialize_number_or_string, deserialize_string_or_number};
use super::Identified;

/// An Electric Service Identifier: one metered service point on an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Esiid {
    pub id: i64,
    #[serde(default, alias = "account_id")]
    pub account_id: Option<i64>,
    #[serde(default, alias = "account_name")]
    pub account_name: Option<String>,
    #[serde(default, alias = "esi_id", deserialize_with = "deserialize_string_or_number")]
    pub esi_id: Option<String>,
    #[serde(default, alias = "service_address_1")]
    pub service_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub status: Option<String>,
    #[serde(default)]
    pub rep: Option<String>,
    #[serde(default, alias = "rate_plan")]
    pub rate_plan: Option<String>,
    #[serde(default, alias = "kwh_mo", deserialize_with = "deserialize_number_or_string")]
    pub kwh_mo: Option<f64>,
    #[serde(default, alias = "kwh_yr", deserialize_with = "deserialize_number_or_string")]
    pub kwh_yr: Option<f64>,
    #[serde(default, alias = "load_profile")]
    pub load_profile: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, alias = "total_bill", deserialize_with = "deserialize_number_or_string")]
    pub total_bill: Option<f64>,
}

impl Identified for Esiid {
    fn id(&self) -> i64 {
        self.id
    }
}
