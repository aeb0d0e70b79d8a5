//! Command-line interface parsing for kilowatt
//!
//! Global flags override `DataConfig` after the config file and
//! environment have been applied.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kilowatt_core::{DataConfig, ListParams, Resource};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("Invalid parameter: '{0}'. Expected key=value")]
    InvalidParam(String),
}

/// Kilowatt data layer - query accounts, pricing and commissions from the
/// backend API or the bundled fixtures
#[derive(Parser, Debug)]
#[command(name = "kilowatt")]
#[command(about = "Query Kilowatt resources with cache-aside loading and static fallback")]
#[command(version)]
pub struct Cli {
    /// Try the backend API before the static fixtures
    #[arg(long, global = true)]
    pub backend: bool,

    /// Backend base URL
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Read fixtures from this directory instead of the bundled set
    #[arg(long, value_name = "DIR", global = true)]
    pub fixtures: Option<PathBuf>,

    /// Cache entry lifetime in seconds (0 disables caching)
    #[arg(long, value_name = "N", global = true)]
    pub ttl_secs: Option<u64>,

    /// Fail instead of using fixtures when the backend is unavailable
    #[arg(long, global = true)]
    pub no_fallback: bool,

    /// Print where the data came from (cache, remote, fallback) to stderr
    #[arg(long, global = true)]
    pub show_source: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every record of a resource
    List {
        resource: Resource,

        /// Query parameter passed to the backend, e.g. --param status=Active
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Show one record by ID
    Show { resource: Resource, id: i64 },

    /// List the ESIIDs on an account
    EsiidsFor { account_id: i64 },

    /// Summary statistics
    Stats { kind: StatsKind },

    /// Backend reachability and system health
    Health,

    /// Print the active configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    Commissions,
    Pricing,
}

pub fn parse_param(s: &str) -> Result<(String, String), CliError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidParam(s.to_string())),
    }
}

impl Cli {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut DataConfig) {
        if self.backend {
            config.use_backend_api = true;
        }
        if let Some(url) = &self.api_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = &self.fixtures {
            config.fixture_dir = Some(dir.clone());
        }
        if let Some(secs) = self.ttl_secs {
            config.cache_ttl_ms = secs.saturating_mul(1000);
        }
        if self.no_fallback {
            config.fallback_to_json = false;
        }
    }
}

pub fn list_params(params: &[(String, String)]) -> ListParams {
    params.iter().cloned().collect()
}
