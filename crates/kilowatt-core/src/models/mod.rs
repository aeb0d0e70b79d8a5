//! Data models for Kilowatt resources.
//!
//! - `Account`, `Esiid`: customer accounts and their service points
//! - `Manager`, `ManagementCompany`: property management
//! - `Commission`, `CommissionStats`: broker commissions
//! - `Provider`, `PricingRecord`, `PricingStats`: retail providers and daily pricing
//! - `Resource`: the named datasets and where each one lives

pub mod account;
pub mod analytics;
pub mod commission;
mod de;
pub mod esiid;
pub mod organization;
pub mod pricing;
pub mod provider;
pub mod resource;

pub use account::{Account, AccountDraft};
pub use analytics::{AnalysisRequest, AnalyticsResults, SystemHealth};
pub use commission::{Commission, CommissionStats};
pub use esiid::Esiid;
pub use organization::{ManagementCompany, Manager};
pub use pricing::{PricingRecord, PricingStats};
pub use provider::Provider;
pub use resource::{Resource, UnknownResource};

/// A record with a numeric primary key.
pub trait Identified {
    fn id(&self) -> i64;
}
