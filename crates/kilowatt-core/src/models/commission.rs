use serde::{Deserialize, Serialize};

use super::de::{deserialize_number_or_string, deserialize_string_or_number};
use super::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: i64,
    #[serde(default, alias = "account_id")]
    pub account_id: Option<i64>,
    #[serde(default, alias = "account_name")]
    pub account_name: Option<String>,
    #[serde(default, alias = "manager_id")]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default, alias = "provider_id")]
    pub provider_id: Option<i64>,
    #[serde(default, alias = "k_rep")]
    pub rep: Option<String>,
    /// "received" or "scheduled"
    #[serde(default, alias = "commission_type")]
    pub commission_type: Option<String>,
    #[serde(default, alias = "commission_amount", alias = "commissionAmount", deserialize_with = "deserialize_number_or_string")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub status: Option<String>,
    #[serde(default, alias = "payment_type")]
    pub payment_type: Option<String>,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
}

impl Identified for Commission {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionStats {
    pub total: usize,
    #[serde(alias = "total_amount")]
    pub total_amount: f64,
    #[serde(alias = "average_amount")]
    pub average_amount: f64,
}

impl CommissionStats {
    /// Totals over `commissions`, counting a missing amount as zero.
    pub fn from_commissions(commissions: &[Commission]) -> Self {
        let total = commissions.len();
        let total_amount: f64 = commissions.iter().map(|c| c.amount.unwrap_or(0.0)).sum();
        let average_amount = if total > 0 {
            total_amount / total as f64
        } else {
            0.0
        };
        Self {
            total,
            total_amount,
            average_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commission(id: i64, amount: Option<f64>) -> Commission {
        Commission {
            id,
            account_id: None,
            account_name: None,
            manager_id: None,
            manager: None,
            provider_id: None,
            rep: None,
            commission_type: None,
            amount,
            status: None,
            payment_type: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_stats_treat_missing_amount_as_zero() {
        let stats = CommissionStats::from_commissions(&[
            commission(1, Some(100.0)),
            commission(2, None),
            commission(3, Some(50.0)),
        ]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_amount, 150.0);
        assert_eq!(stats.average_amount, 50.0);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(CommissionStats::from_commissions(&[]), CommissionStats::default());
    }

    #[test]
    fn test_parse_decimal_string_amount() {
        let c: Commission =
            serde_json::from_str(r#"{"id": 5, "k_rep": "TXU", "amount": "412.75"}"#).unwrap();
        assert_eq!(c.rep.as_deref(), Some("TXU"));
        assert_eq!(c.amount, Some(412.75));
    }
}
