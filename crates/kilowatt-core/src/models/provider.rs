use serde::{Deserialize, Serialize};

use super::de::deserialize_string_or_number;
use super::Identified;

/// A retail electric provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub provider_type: Option<String>,
    #[serde(default, alias = "rep_phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "rep_email")]
    pub email: Option<String>,
    #[serde(default, alias = "rep_contact")]
    pub contact: Option<String>,
    #[serde(default, alias = "city_state_zip")]
    pub location: Option<String>,
    #[serde(default, alias = "refund_type")]
    pub refund_type: Option<String>,
    #[serde(default, alias = "rep_active", deserialize_with = "deserialize_string_or_number")]
    pub is_rep_active: Option<String>,
}

impl Provider {
    pub fn is_active(&self) -> bool {
        matches!(
            self.is_rep_active.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("1" | "true" | "yes")
        )
    }
}

impl Identified for Provider {
    fn id(&self) -> i64 {
        self.id
    }
}
