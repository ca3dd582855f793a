use kimp_core::PremiumService;
use serde_json::json;

use crate::error::CliError;
use crate::output::{cell, Table};

use super::CommandResult;

pub async fn run(service: &PremiumService) -> Result<CommandResult, CliError> {
    let rate = service.exchange_rate().await;

    let mut table = Table::new(vec!["PAIR", "RATE", "ORIGIN"]);
    table.push_row(vec![
        String::from("USD/KRW"),
        cell(Some(rate.value()), 2),
        rate.origin().as_str().to_owned(),
    ]);

    let mut result = CommandResult::ok(json!({ "USD_KRW": rate.value() }), table)
        .with_rate_origin(rate.origin());
    if rate.is_fallback() {
        result = result.with_warning(format!(
            "live USD/KRW rate unavailable, using fallback {}",
            rate.value()
        ));
    }
    Ok(result)
}
