//! Data-layer configuration.
//!
//! Settings come from, in increasing priority: built-in defaults, the
//! JSON file at `~/.config/kilowatt/config.json`, and `KILOWATT_*`
//! environment variables. The binary applies its own flags on top.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loader::DEFAULT_TTL;

/// Application name used for the config directory path
const APP_NAME: &str = "kilowatt";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Per-request timeout for backend calls.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

pub const ENV_USE_BACKEND_API: &str = "KILOWATT_USE_BACKEND_API";
pub const ENV_API_URL: &str = "KILOWATT_API_URL";
pub const ENV_FALLBACK_TO_JSON: &str = "KILOWATT_FALLBACK_TO_JSON";
pub const ENV_API_TIMEOUT_MS: &str = "KILOWATT_API_TIMEOUT_MS";
pub const ENV_CACHE_TTL_MS: &str = "KILOWATT_CACHE_TTL_MS";
pub const ENV_STAGE_TIMEOUT_MS: &str = "KILOWATT_STAGE_TIMEOUT_MS";
pub const ENV_FIXTURE_DIR: &str = "KILOWATT_FIXTURE_DIR";
pub const ENV_COALESCE_REQUESTS: &str = "KILOWATT_COALESCE_REQUESTS";
pub const ENV_DEBUG: &str = "KILOWATT_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Try the backend API before the static fixtures.
    pub use_backend_api: bool,
    pub api_base_url: String,
    /// Fall back to fixtures when the backend fails.
    pub fallback_to_json: bool,
    /// Per HTTP request, so each rate-limit retry gets the full budget.
    pub api_timeout_ms: u64,
    pub cache_ttl_ms: u64,
    /// Bound on a whole load stage, retries included. Zero means unbounded.
    pub stage_timeout_ms: u64,
    /// Read fixtures from this directory instead of the bundled set.
    pub fixture_dir: Option<PathBuf>,
    /// Let overlapping loads of one resource share a single fetch.
    pub coalesce_requests: bool,
    pub debug: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            use_backend_api: false,
            api_base_url: DEFAULT_API_URL.to_string(),
            fallback_to_json: true,
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS,
            cache_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            stage_timeout_ms: 0,
            fixture_dir: None,
            coalesce_requests: false,
            debug: false,
        }
    }
}

/// Short description of the active configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub data_source: &'static str,
    pub api_url: String,
    pub fallback: &'static str,
    pub cache_ttl_ms: u64,
}

impl DataConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) => Self::load_from(&path)?,
            Err(e) => {
                warn!(error = %e, "No config directory, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Override fields from `lookup`. Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_USE_BACKEND_API) {
            set_parsed(&mut self.use_backend_api, ENV_USE_BACKEND_API, &v, parse_bool);
        }
        if let Some(v) = lookup(ENV_API_URL) {
            let v = v.trim();
            if !v.is_empty() {
                self.api_base_url = v.trim_end_matches('/').to_string();
            }
        }
        if let Some(v) = lookup(ENV_FALLBACK_TO_JSON) {
            set_parsed(&mut self.fallback_to_json, ENV_FALLBACK_TO_JSON, &v, parse_bool);
        }
        if let Some(v) = lookup(ENV_API_TIMEOUT_MS) {
            set_parsed(&mut self.api_timeout_ms, ENV_API_TIMEOUT_MS, &v, |s| s.parse().ok());
        }
        if let Some(v) = lookup(ENV_CACHE_TTL_MS) {
            set_parsed(&mut self.cache_ttl_ms, ENV_CACHE_TTL_MS, &v, |s| s.parse().ok());
        }
        if let Some(v) = lookup(ENV_STAGE_TIMEOUT_MS) {
            set_parsed(&mut self.stage_timeout_ms, ENV_STAGE_TIMEOUT_MS, &v, |s| s.parse().ok());
        }
        if let Some(v) = lookup(ENV_FIXTURE_DIR) {
            if !v.trim().is_empty() {
                self.fixture_dir = Some(PathBuf::from(v.trim()));
            }
        }
        if let Some(v) = lookup(ENV_COALESCE_REQUESTS) {
            set_parsed(&mut self.coalesce_requests, ENV_COALESCE_REQUESTS, &v, parse_bool);
        }
        if let Some(v) = lookup(ENV_DEBUG) {
            set_parsed(&mut self.debug, ENV_DEBUG, &v, parse_bool);
        }
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            data_source: if self.use_backend_api {
                "Backend API"
            } else {
                "Static JSON Files"
            },
            api_url: self.api_base_url.clone(),
            fallback: match (self.use_backend_api, self.fallback_to_json) {
                (false, _) => "n/a",
                (true, true) => "Static JSON Files",
                (true, false) => "disabled",
            },
            cache_ttl_ms: self.cache_ttl_ms,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn set_parsed<T>(field: &mut T, key: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) {
    match parse(raw.trim()) {
        Some(value) => *field = value,
        None => warn!(key, value = raw, "Ignoring invalid environment value"),
    }
}
