use kimp_core::{AssetId, CoinPremium, PremiumService};

use crate::cli::CoinArgs;
use crate::error::CliError;
use crate::output::{cell, Table};

use super::CommandResult;

pub async fn run(args: &CoinArgs, service: &PremiumService) -> Result<CommandResult, CliError> {
    let coin = AssetId::parse(&args.symbol)?;
    let view = service.coin_premium(&coin).await;

    let mut result = CommandResult::ok(serde_json::to_value(&view)?, build_table(&view));
    if view.binance.is_none() {
        result = result.with_warning(format!("{coin} has no Binance USDT price"));
    }
    if view.upbit.is_none() && view.bithumb.is_none() {
        result = result.with_warning(format!("{coin} has no KRW price on Upbit or Bithumb"));
    }
    Ok(result)
}

fn build_table(view: &CoinPremium) -> Table {
    let mut table = Table::new(vec!["EXCHANGE", "PRICE", "PREMIUM %"]);
    table.push_row(vec![
        String::from("upbit"),
        cell(view.upbit, 0),
        cell(view.upbit_premium, 2),
    ]);
    table.push_row(vec![
        String::from("bithumb"),
        cell(view.bithumb, 0),
        cell(view.bithumb_premium, 2),
    ]);
    table.push_row(vec![String::from("binance"), cell(view.binance, 4), String::from("-")]);
    table.push_row(vec![
        String::from("usd/krw"),
        cell(Some(view.exchange_rate), 2),
        String::from("-"),
    ]);
    table
}
