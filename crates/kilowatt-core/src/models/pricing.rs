use serde::{Deserialize, Serialize};

use super::de::deserialize_number_or_string;
use super::Identified;

/// One daily price quote for a zone and load profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRecord {
    pub id: i64,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, alias = "load_profile")]
    pub load_profile: Option<String>,
    #[serde(default)]
    pub rep: Option<String>,
    #[serde(default, alias = "term_months", deserialize_with = "deserialize_number_or_string")]
    pub term_months: Option<f64>,
    #[serde(default, alias = "daily_rate", deserialize_with = "deserialize_number_or_string")]
    pub daily_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_number_or_string")]
    pub price: Option<f64>,
    #[serde(default, alias = "provider_id")]
    pub provider_id: Option<i64>,
    #[serde(default, alias = "price_date")]
    pub price_date: Option<String>,
}

impl Identified for PricingRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingStats {
    pub total: usize,
    #[serde(alias = "average_price")]
    pub average_price: f64,
}

impl PricingStats {
    /// Average of `price` over all records, counting a missing price as zero.
    pub fn from_records(records: &[PricingRecord]) -> Self {
        let total = records.len();
        let average_price = if total > 0 {
            records.iter().map(|p| p.price.unwrap_or(0.0)).sum::<f64>() / total as f64
        } else {
            0.0
        };
        Self {
            total,
            average_price,
        }
    }
}
