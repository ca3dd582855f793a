mod coin;
mod premium;
mod prices;
mod rate;

use std::time::Instant;

use kimp_core::{AssetId, PremiumService, RateOrigin, UpstreamConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Envelope;
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub table: Table,
    pub warnings: Vec<String>,
    pub rate_origin: Option<RateOrigin>,
}

impl CommandResult {
    pub fn ok(data: Value, table: Table) -> Self {
        Self {
            data,
            table,
            warnings: Vec::new(),
            rate_origin: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_rate_origin(mut self, origin: RateOrigin) -> Self {
        self.rate_origin = Some(origin);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<(Envelope, Table), CliError> {
    let mut config = UpstreamConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    let service = PremiumService::live(&config)?;

    let started = Instant::now();
    let result = match &cli.command {
        Command::Premium(args) => premium::run(args, &service).await?,
        Command::Coin(args) => coin::run(args, &service).await?,
        Command::Rate => rate::run(&service).await?,
        Command::Prices(args) => prices::run(args, &service).await?,
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let CommandResult {
        data,
        table,
        warnings,
        rate_origin,
    } = result;

    let envelope = Envelope::new(data, latency_ms)
        .with_rate_origin(rate_origin)
        .with_warnings(warnings);

    Ok((envelope, table))
}

pub(crate) fn parse_symbols(raw: &[String]) -> Result<Vec<AssetId>, CliError> {
    raw.iter()
        .map(|symbol| AssetId::parse(symbol))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CliError::from)
}
