//! Shared fixtures for the kimp-core integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use kimp_core::{FixtureHttpClient, PremiumService, RetryConfig, UpstreamConfig};
use serde_json::{json, Map, Value};

pub const UPBIT: &str = "https://upbit.test";
pub const BITHUMB: &str = "https://bithumb.test";
pub const BINANCE: &str = "https://binance.test";
pub const FX: &str = "https://fx.test/v4/latest/USD";

pub fn fixture_config() -> UpstreamConfig {
    UpstreamConfig {
        upbit_base_url: UPBIT.to_owned(),
        bithumb_base_url: BITHUMB.to_owned(),
        binance_base_url: BINANCE.to_owned(),
        fx_url: FX.to_owned(),
        binance_requests_per_second: 1_000,
        retry: RetryConfig::no_retry(),
        ..UpstreamConfig::default()
    }
}

pub fn service(fixture: &FixtureHttpClient) -> PremiumService {
    PremiumService::from_config(Arc::new(fixture.clone()), &fixture_config())
}

pub fn upbit_market_all_url() -> String {
    format!("{UPBIT}/v1/market/all")
}

pub fn upbit_ticker_url(symbols: &[&str]) -> String {
    let markets: Vec<String> = symbols.iter().map(|symbol| format!("KRW-{symbol}")).collect();
    format!("{UPBIT}/v1/ticker?markets={}", markets.join(","))
}

pub fn bithumb_ticker_url() -> String {
    format!("{BITHUMB}/public/ticker/ALL_KRW")
}

pub fn bithumb_market_all_url() -> String {
    format!("{BITHUMB}/v1/market/all")
}

pub fn binance_exchange_info_url() -> String {
    format!("{BINANCE}/api/v3/exchangeInfo")
}

pub fn binance_price_url(pair: &str) -> String {
    format!("{BINANCE}/api/v3/ticker/price?symbol={pair}")
}

/// `/v1/market/all` body: `(market, korean_name, english_name)`.
pub fn market_all(entries: &[(&str, &str, &str)]) -> String {
    let entries: Vec<Value> = entries
        .iter()
        .map(|(market, korean, english)| {
            json!({"market": market, "korean_name": korean, "english_name": english})
        })
        .collect();
    Value::Array(entries).to_string()
}

/// Upbit ticker body: `(market, trade_price, acc_trade_price_24h)`.
pub fn upbit_tickers(entries: &[(&str, f64, f64)]) -> String {
    let entries: Vec<Value> = entries
        .iter()
        .map(|(market, price, traded)| {
            json!({
                "market": market,
                "trade_price": price,
                "acc_trade_price_24h": traded,
                "acc_trade_volume_24h": 0.0
            })
        })
        .collect();
    Value::Array(entries).to_string()
}

/// Bithumb `ALL_KRW` body: `(symbol, closing_price, units_traded_24H)`.
pub fn bithumb_tickers(entries: &[(&str, &str, &str)]) -> String {
    let mut data = Map::new();
    for (symbol, closing, units) in entries {
        data.insert(
            (*symbol).to_owned(),
            json!({"closing_price": closing, "units_traded_24H": units, "opening_price": closing}),
        );
    }
    data.insert(String::from("date"), json!("1717000000000"));
    json!({"status": "0000", "data": data}).to_string()
}

pub fn exchange_info(trading: &[&str]) -> String {
    let symbols: Vec<Value> = trading
        .iter()
        .map(|symbol| json!({"symbol": symbol, "status": "TRADING"}))
        .collect();
    json!({"timezone": "UTC", "symbols": symbols}).to_string()
}

pub fn binance_price(pair: &str, price: &str) -> String {
    json!({"symbol": pair, "price": price}).to_string()
}

pub fn fx_rate(krw: f64) -> String {
    json!({"base": "USD", "rates": {"KRW": krw, "USD": 1.0}}).to_string()
}

pub fn approx(left: f64, right: f64, tolerance: f64) -> bool {
    (left - right).abs() <= tolerance
}
