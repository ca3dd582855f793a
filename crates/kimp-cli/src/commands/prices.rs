use std::collections::BTreeMap;

use kimp_core::{ExchangeId, PremiumService, SourceErrorKind};

use crate::cli::PricesArgs;
use crate::error::CliError;
use crate::output::{cell, Table};

use super::{parse_symbols, CommandResult};

pub async fn run(args: &PricesArgs, service: &PremiumService) -> Result<CommandResult, CliError> {
    let exchange: ExchangeId = args.exchange.parse()?;
    let symbols = parse_symbols(&args.symbols)?;

    let outcome = service.prices(exchange, &symbols).await;
    if let Some(error) = outcome
        .error()
        .filter(|error| error.kind() == SourceErrorKind::InvalidRequest)
    {
        return Err(CliError::Command(error.message().to_owned()));
    }
    let warning = outcome.error().map(|error| format!("{exchange}: {error}"));
    let book = outcome.into_map();

    let prices: BTreeMap<&str, f64> = book
        .iter()
        .map(|(symbol, point)| (symbol.as_str(), point.price))
        .collect();

    let mut table = Table::new(vec!["SYMBOL", "PRICE", "VOLUME 24H"]);
    let mut ordered: Vec<_> = book.values().collect();
    ordered.sort_by(|left, right| left.symbol.cmp(&right.symbol));
    let precision = if exchange.is_domestic() { 0 } else { 4 };
    for point in ordered {
        table.push_row(vec![
            point.symbol.to_string(),
            cell(Some(point.price), precision),
            cell(point.volume_24h, 0),
        ]);
    }

    let mut result = CommandResult::ok(serde_json::to_value(prices)?, table);
    if let Some(warning) = warning {
        result = result.with_warning(warning);
    }
    Ok(result)
}
