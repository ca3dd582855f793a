//! Identifier reconciliation between the domestic and international markets.

use std::collections::BTreeSet;

use crate::AssetId;

/// Prefix of KRW-quoted markets in Upbit and Bithumb listings.
pub const DOMESTIC_MARKET_PREFIX: &str = "KRW-";
/// Quote currency of every Binance pair the pipeline reads.
pub const INTERNATIONAL_QUOTE: &str = "USDT";
/// Asset whose international price is pinned to 1.0.
pub const STABLE_ASSET: &str = "USDT";

/// Union of two identifier sets, de-duplicated.
///
/// `AssetId` is already case-normalized, so `btc` and `BTC` collapse here.
pub fn reconcile<'a, A, B>(a: A, b: B) -> BTreeSet<AssetId>
where
    A: IntoIterator<Item = &'a AssetId>,
    B: IntoIterator<Item = &'a AssetId>,
{
    a.into_iter().chain(b).cloned().collect()
}

/// Binance spot pair for an asset, e.g. `BTC` to `BTCUSDT`.
pub fn to_international_pair(id: &AssetId) -> String {
    format!("{}{INTERNATIONAL_QUOTE}", id.as_str())
}

/// Asset of a KRW market such as `KRW-BTC`. Other quote markets yield `None`.
pub fn domestic_market_symbol(market: &str) -> Option<AssetId> {
    let prefix = market.get(..DOMESTIC_MARKET_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(DOMESTIC_MARKET_PREFIX) {
        return None;
    }

    AssetId::parse(&market[DOMESTIC_MARKET_PREFIX.len()..]).ok()
}

/// Inverse of [`domestic_market_symbol`].
pub fn domestic_market(id: &AssetId) -> String {
    format!("{DOMESTIC_MARKET_PREFIX}{}", id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> AssetId {
        AssetId::parse(raw).expect("valid symbol")
    }

    #[test]
    fn union_collapses_duplicates_across_cases() {
        let upbit = [id("btc"), id("ETH")];
        let bithumb = [id("BTC"), id("xrp")];

        let merged = reconcile(&upbit, &bithumb);
        let names: Vec<&str> = merged.iter().map(AssetId::as_str).collect();
        assert_eq!(names, vec!["BTC", "ETH", "XRP"]);
    }

    #[test]
    fn maps_asset_to_usdt_pair() {
        assert_eq!(to_international_pair(&id("sol")), "SOLUSDT");
    }

    #[test]
    fn only_krw_markets_yield_an_asset() {
        assert_eq!(domestic_market_symbol("KRW-BTC"), Some(id("BTC")));
        assert_eq!(domestic_market_symbol("krw-eth"), Some(id("ETH")));
        assert_eq!(domestic_market_symbol("BTC-ETH"), None);
        assert_eq!(domestic_market_symbol("USDT-BTC"), None);
        assert_eq!(domestic_market_symbol("KRW-"), None);
        assert_eq!(domestic_market_symbol("KR"), None);
    }

    #[test]
    fn builds_domestic_market_code() {
        assert_eq!(domestic_market(&id("doge")), "KRW-DOGE");
    }
}
