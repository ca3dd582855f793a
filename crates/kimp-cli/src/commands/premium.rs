use std::cmp::Ordering;
use std::collections::BTreeMap;

use kimp_core::{PremiumRecord, PremiumService};

use crate::cli::{PremiumArgs, SortKey};
use crate::error::CliError;
use crate::output::{cell, Table};

use super::CommandResult;

pub async fn run(args: &PremiumArgs, service: &PremiumService) -> Result<CommandResult, CliError> {
    let report = service.all_premium_data().await;

    let mut records: Vec<&PremiumRecord> = report.records.values().collect();
    sort_records(&mut records, args.sort);
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    let keyed: BTreeMap<&str, &PremiumRecord> = records
        .iter()
        .map(|record| (record.symbol().as_str(), *record))
        .collect();
    let data = serde_json::to_value(keyed)?;

    let warnings = report
        .warnings
        .iter()
        .map(|warning| format!("{}: {} ({})", warning.source, warning.message, warning.code))
        .collect();

    Ok(CommandResult::ok(data, build_table(&records))
        .with_warnings(warnings)
        .with_rate_origin(report.exchange_rate.origin()))
}

fn sort_records(records: &mut [&PremiumRecord], key: SortKey) {
    let descending = |left: f64, right: f64| right.partial_cmp(&left).unwrap_or(Ordering::Equal);

    match key {
        SortKey::Volume => records.sort_by(|left, right| {
            match (left.total_volume_24h(), right.total_volume_24h()) {
                (Some(l), Some(r)) => descending(l, r),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => left.symbol().cmp(right.symbol()),
            }
        }),
        SortKey::Premium => records.sort_by(|left, right| {
            descending(left.headline_premium(), right.headline_premium())
                .then_with(|| left.symbol().cmp(right.symbol()))
        }),
        SortKey::Symbol => records.sort_by(|left, right| left.symbol().cmp(right.symbol())),
    }
}

fn build_table(records: &[&PremiumRecord]) -> Table {
    let mut table = Table::new(vec![
        "SYMBOL",
        "NAME",
        "UPBIT",
        "BITHUMB",
        "BINANCE",
        "UPBIT %",
        "BITHUMB %",
        "VOLUME 24H",
    ]);

    for record in records {
        table.push_row(vec![
            record.symbol().to_string(),
            record
                .metadata()
                .map(|metadata| metadata.english_name.clone())
                .unwrap_or_default(),
            cell(record.upbit().map(|leg| leg.price), 0),
            cell(record.bithumb().map(|leg| leg.price), 0),
            cell(Some(record.binance()), 4),
            cell(record.upbit().map(|leg| leg.premium), 2),
            cell(record.bithumb().map(|leg| leg.premium), 2),
            cell(record.total_volume_24h(), 0),
        ]);
    }

    table
}
