use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::Resource;

/// Where fallback data is read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixtureSource {
    /// Fixtures compiled into the crate.
    #[default]
    Bundled,
    /// A directory holding one `<resource>.json` per resource.
    Directory(PathBuf),
}

impl FixtureSource {
    pub fn bundled() -> Self {
        FixtureSource::Bundled
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        FixtureSource::Directory(path.into())
    }

    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        dir.map(FixtureSource::Directory).unwrap_or_default()
    }

    /// Read and parse the fixture for `resource`.
    pub async fn load<T: DeserializeOwned>(&self, resource: Resource) -> Result<T> {
        let raw = self.raw(resource).await?;
        parse_fixture(&raw).with_context(|| format!("Failed to parse fixture {}", resource.fixture_file()))
    }

    /// Like [`load`](Self::load), keeping only the rows that match every
    /// `(field, value)` pair.
    ///
    /// Fields are looked up as given and in camelCase (`manager_id` also
    /// matches `managerId`). A parameter naming a field no row carries,
    /// such as paging, is ignored.
    pub async fn load_filtered<T: DeserializeOwned>(
        &self,
        resource: Resource,
        params: &[(String, String)],
    ) -> Result<T> {
        if params.is_empty() {
            return self.load(resource).await;
        }
        let raw = self.raw(resource).await?;
        let value: Value = serde_json::from_str(&raw).context("Fixture is not valid JSON")?;
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Object(mut map) => match map.remove("default") {
                Some(Value::Array(rows)) => rows,
                _ => bail!("Fixture {} is not a list and cannot be filtered", resource.fixture_file()),
            },
            _ => bail!("Fixture {} is not a list and cannot be filtered", resource.fixture_file()),
        };
        let rows = filter_rows(rows, params);
        debug!(resource = %resource, matched = rows.len(), "Filtered fixture rows");
        serde_json::from_value(Value::Array(rows))
            .with_context(|| format!("Failed to parse fixture {}", resource.fixture_file()))
    }

    async fn raw(&self, resource: Resource) -> Result<String> {
        match self {
            FixtureSource::Bundled => Ok(bundled(resource).to_string()),
            FixtureSource::Directory(dir) => {
                let path = dir.join(resource.fixture_file());
                debug!(path = %path.display(), "Reading fixture");
                tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read fixture file: {}", path.display()))
            }
        }
    }
}

fn bundled(resource: Resource) -> &'static str {
    match resource {
        Resource::Accounts => include_str!("../../data/accounts.json"),
        Resource::Esiids => include_str!("../../data/esiids.json"),
        Resource::Managers => include_str!("../../data/managers.json"),
        Resource::Companies => include_str!("../../data/companies.json"),
        Resource::Commissions => include_str!("../../data/commissions.json"),
        Resource::Providers => include_str!("../../data/providers.json"),
        Resource::Pricing => include_str!("../../data/pricing.json"),
        Resource::Analytics => include_str!("../../data/analytics-results.json"),
    }
}

/// Parse a fixture document as `T`.
///
/// Documents exported as ES modules are wrapped as `{"default": ...}`; when
/// the document does not parse as `T` directly, the `default` member is tried.
pub fn parse_fixture<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(raw).context("Fixture is not valid JSON")?;
    let direct_err = match serde_json::from_value::<T>(value.clone()) {
        Ok(data) => return Ok(data),
        Err(e) => e,
    };
    match value {
        serde_json::Value::Object(mut map) if map.contains_key("default") => {
            let inner = map.remove("default").unwrap_or_default();
            serde_json::from_value(inner).context("Fixture `default` member has the wrong shape")
        }
        _ => Err(direct_err.into()),
    }
}

/// Keep the rows of `rows` that match every applicable parameter.
pub fn filter_rows(rows: Vec<Value>, params: &[(String, String)]) -> Vec<Value> {
    let applicable: Vec<&(String, String)> = params
        .iter()
        .filter(|(key, _)| {
            rows.iter()
                .any(|row| row.as_object().is_some_and(|obj| field(obj, key).is_some()))
        })
        .collect();

    rows.into_iter()
        .filter(|row| {
            let Some(obj) = row.as_object() else {
                return false;
            };
            applicable
                .iter()
                .all(|(key, expected)| field(obj, key).is_some_and(|v| matches_param(v, expected)))
        })
        .collect()
}

fn field<'a>(row: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    row.get(key).or_else(|| row.get(&camel_case(key)))
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn matches_param(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case(expected),
        Value::Number(n) => match (n.as_f64(), expected.parse::<f64>()) {
            (Some(actual), Ok(wanted)) => actual == wanted,
            _ => n.to_string() == expected,
        },
        Value::Bool(b) => b.to_string().eq_ignore_ascii_case(expected),
        _ => false,
    }
}
