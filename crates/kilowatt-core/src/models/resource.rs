use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A logical dataset served by the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Accounts,
    Esiids,
    Managers,
    Companies,
    Commissions,
    Providers,
    Pricing,
    Analytics,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown resource: '{0}'. Valid resources: accounts, esiids, managers, companies, commissions, providers, pricing, analytics")]
pub struct UnknownResource(pub String);

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Accounts,
        Resource::Esiids,
        Resource::Managers,
        Resource::Companies,
        Resource::Commissions,
        Resource::Providers,
        Resource::Pricing,
        Resource::Analytics,
    ];

    /// Cache key and log name.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::Accounts => "accounts",
            Resource::Esiids => "esiids",
            Resource::Managers => "managers",
            Resource::Companies => "companies",
            Resource::Commissions => "commissions",
            Resource::Providers => "providers",
            Resource::Pricing => "pricing",
            Resource::Analytics => "analytics",
        }
    }

    /// Backend collection path.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Resource::Accounts => "/api/v1/accounts",
            Resource::Esiids => "/api/v1/esiids",
            Resource::Managers => "/api/v1/managers",
            Resource::Companies => "/api/v1/management-companies",
            Resource::Commissions => "/api/v1/commissions",
            Resource::Providers => "/api/v1/providers",
            Resource::Pricing => "/api/v1/pricing",
            Resource::Analytics => "/api/v1/analytics/results",
        }
    }

    /// Static fixture file name.
    pub fn fixture_file(&self) -> &'static str {
        match self {
            Resource::Analytics => "analytics-results.json",
            Resource::Accounts => "accounts.json",
            Resource::Esiids => "esiids.json",
            Resource::Managers => "managers.json",
            Resource::Companies => "companies.json",
            Resource::Commissions => "commissions.json",
            Resource::Providers => "providers.json",
            Resource::Pricing => "pricing.json",
        }
    }

    pub fn item_endpoint(&self, id: i64) -> String {
        format!("{}/{}", self.endpoint(), id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "management-companies" | "management_companies" => return Ok(Resource::Companies),
            "daily-pricing" | "daily_pricing" => return Ok(Resource::Pricing),
            _ => {}
        }
        Resource::ALL
            .into_iter()
            .find(|r| r.key() == normalized)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_keys() {
        for resource in Resource::ALL {
            assert_eq!(resource.key().parse::<Resource>(), Ok(resource));
        }
    }

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!("Accounts".parse::<Resource>(), Ok(Resource::Accounts));
        assert_eq!("management-companies".parse::<Resource>(), Ok(Resource::Companies));
        assert!("tasks".parse::<Resource>().is_err());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(Resource::Companies.endpoint(), "/api/v1/management-companies");
        assert_eq!(Resource::Esiids.item_endpoint(7), "/api/v1/esiids/7");
        assert_eq!(Resource::Analytics.fixture_file(), "analytics-results.json");
    }
}
