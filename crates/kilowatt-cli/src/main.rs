//! kilowatt - command-line front end for the Kilowatt data layer.
//!
//! Works offline from the bundled fixtures by default; pass `--backend`
//! (or set `KILOWATT_USE_BACKEND_API`) to query the REST backend first.

mod cli;

use std::io;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use kilowatt_core::models::{
    Account, Commission, Esiid, ManagementCompany, Manager, PricingRecord, Provider,
};
use kilowatt_core::{DataConfig, DataServices, DataSource, ListParams, Resource};

use cli::{list_params, Cli, Command, StatsKind};

/// Keeps the log writer alive and, when RUST_LOG is unset, the handle used
/// to raise the level once the config is known.
struct Logging {
    _guard: WorkerGuard,
    filter: Option<reload::Handle<EnvFilter, Registry>>,
}

impl Logging {
    fn enable_debug(&self) {
        if let Some(handle) = &self.filter {
            if let Err(e) = handle.modify(|filter| *filter = EnvFilter::new("debug")) {
                warn!(error = %e, "Failed to raise log level");
            }
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// RUST_LOG wins; otherwise logging starts at warn so config warnings are
/// seen, and `debug` mode raises it afterwards.
fn init_tracing() -> Logging {
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    match EnvFilter::try_from_default_env() {
        Ok(filter) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer))
                .init();
            Logging {
                _guard: guard,
                filter: None,
            }
        }
        Err(_) => {
            let (filter, handle) = reload::Layer::new(EnvFilter::new("warn"));
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer))
                .init();
            Logging {
                _guard: guard,
                filter: Some(handle),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let logging = init_tracing();

    let mut config = DataConfig::load()?;
    cli.apply_to(&mut config);
    if config.debug {
        logging.enable_debug();
    }
    info!(command = ?cli.command, "kilowatt starting");

    let services = DataServices::new(config)?;
    let output = run(&cli, &services).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(cli: &Cli, services: &DataServices) -> Result<Value> {
    match &cli.command {
        Command::List { resource, params } => {
            let params = list_params(params);
            let (value, source) = list(services, *resource, &params).await?;
            if cli.show_source {
                eprintln!("source: {}", source);
            }
            Ok(value)
        }
        Command::Show { resource, id } => show(services, *resource, *id).await,
        Command::EsiidsFor { account_id } => {
            let esiids = services.esiids().by_account(*account_id).await?;
            Ok(serde_json::to_value(esiids)?)
        }
        Command::Stats { kind } => match kind {
            StatsKind::Commissions => Ok(serde_json::to_value(services.commissions().stats().await?)?),
            StatsKind::Pricing => Ok(serde_json::to_value(services.pricing().stats().await?)?),
        },
        Command::Health => {
            let health = services.health();
            let reachable = health.check_backend().await;
            let system = health.system_health().await;
            Ok(json!({
                "backend_reachable": reachable,
                "system": system,
            }))
        }
        Command::Config => {
            let path = DataConfig::config_path()
                .map(|p| p.display().to_string())
                .ok();
            Ok(json!({
                "config_path": path,
                "summary": services.config().summary(),
                "settings": services.config(),
            }))
        }
    }
}

/// Load a resource with its typed model and hand it back as JSON.
async fn load_as<T>(
    services: &DataServices,
    resource: Resource,
    params: &ListParams,
) -> Result<(Value, DataSource)>
where
    T: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    let loaded = services.load_resource::<T>(resource, params).await?;
    Ok((serde_json::to_value(&*loaded.data)?, loaded.source))
}

async fn list(
    services: &DataServices,
    resource: Resource,
    params: &ListParams,
) -> Result<(Value, DataSource)> {
    match resource {
        Resource::Accounts => load_as::<Vec<Account>>(services, resource, params).await,
        Resource::Esiids => load_as::<Vec<Esiid>>(services, resource, params).await,
        Resource::Managers => load_as::<Vec<Manager>>(services, resource, params).await,
        Resource::Companies => load_as::<Vec<ManagementCompany>>(services, resource, params).await,
        Resource::Commissions => load_as::<Vec<Commission>>(services, resource, params).await,
        Resource::Providers => load_as::<Vec<Provider>>(services, resource, params).await,
        Resource::Pricing => load_as::<Vec<PricingRecord>>(services, resource, params).await,
        Resource::Analytics => load_as::<Value>(services, resource, params).await,
    }
}

async fn show(services: &DataServices, resource: Resource, id: i64) -> Result<Value> {
    let value = match resource {
        Resource::Accounts => serde_json::to_value(services.accounts().by_id(id).await?)?,
        Resource::Esiids => serde_json::to_value(services.esiids().by_id(id).await?)?,
        Resource::Managers => serde_json::to_value(services.managers().by_id(id).await?)?,
        other => bail!("show is not available for {}; use `list {}`", other, other),
    };
    Ok(value)
}
