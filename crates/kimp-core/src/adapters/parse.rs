//! Lenient field parsing shared by the exchange clients.

use serde::Deserialize;
use serde_json::Value;

use crate::reconcile::domestic_market_symbol;
use crate::{AssetId, AssetMetadata, ListingBook};

/// Number from a JSON number or numeric string. Non-finite values are rejected.
pub(crate) fn number_field(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

#[derive(Debug, Deserialize)]
struct MarketListingEntry {
    market: String,
    korean_name: String,
    english_name: String,
}

/// Assets of every `KRW-` market in a `/v1/market/all` payload, in listing order.
pub(crate) fn krw_markets(entries: &[Value]) -> Vec<AssetId> {
    entries
        .iter()
        .filter_map(|entry| entry.get("market")?.as_str())
        .filter_map(domestic_market_symbol)
        .collect()
}

/// Display names of every `KRW-` market. Entries missing a field are skipped.
pub(crate) fn krw_listing(entries: Vec<Value>) -> ListingBook {
    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<MarketListingEntry>(entry).ok())
        .filter_map(|entry| {
            let symbol = domestic_market_symbol(&entry.market)?;
            Some((
                symbol.clone(),
                AssetMetadata::new(symbol, entry.korean_name, entry.english_name),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_parse_from_strings_and_numbers() {
        assert_eq!(number_field(&json!(1.5)), Some(1.5));
        assert_eq!(number_field(&json!(" 149500000 ")), Some(149_500_000.0));
        assert_eq!(number_field(&json!("n/a")), None);
        assert_eq!(number_field(&json!(null)), None);
        assert_eq!(number_field(&json!(true)), None);
    }

    #[test]
    fn listing_keeps_only_complete_krw_entries() {
        let entries = vec![
            json!({"market": "KRW-BTC", "korean_name": "비트코인", "english_name": "Bitcoin"}),
            json!({"market": "BTC-ETH", "korean_name": "이더리움", "english_name": "Ethereum"}),
            json!({"market": "KRW-XRP", "english_name": "Ripple"}),
            json!("garbage"),
        ];

        let markets = krw_markets(&entries);
        assert_eq!(markets.len(), 2);

        let listing = krw_listing(entries);
        assert_eq!(listing.len(), 1);
        let btc = &listing["BTC"];
        assert_eq!(btc.korean_name, "비트코인");
        assert_eq!(btc.english_name, "Bitcoin");
    }
}
