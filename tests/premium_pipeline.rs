//! Behavior tests for the full premium aggregation run.
//!
//! Every upstream is served by `FixtureHttpClient`; no network is used.

mod support;

use kimp_core::{FixtureHttpClient, HttpError, RateOrigin};
use support::*;

fn btc_scenario() -> FixtureHttpClient {
    FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(
            upbit_market_all_url(),
            market_all(&[("KRW-BTC", "비트코인", "Bitcoin")]),
        )
        .with_json(
            upbit_ticker_url(&["BTC"]),
            upbit_tickers(&[("KRW-BTC", 150_000_000.0, 10.0)]),
        )
        .with_json(
            bithumb_ticker_url(),
            bithumb_tickers(&[("BTC", "149500000", "0.0000000334448160535117")]),
        )
        .with_json(
            bithumb_market_all_url(),
            market_all(&[("KRW-BTC", "비트코인", "Bitcoin")]),
        )
        .with_json(binance_exchange_info_url(), exchange_info(&["BTCUSDT"]))
        .with_json(binance_price_url("BTCUSDT"), binance_price("BTCUSDT", "100000.00"))
}

// =============================================================================
// Pipeline: Joined Output
// =============================================================================

#[tokio::test]
async fn when_btc_is_listed_everywhere_one_record_with_both_premiums_is_emitted() {
    // Given: BTC priced on Upbit, Bithumb and Binance at a live rate of 1390
    let fixture = btc_scenario();

    // When: The full aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: Exactly one BTC record carries both premiums and the summed volume
    assert_eq!(report.records.len(), 1);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    assert_eq!(report.exchange_rate.origin(), RateOrigin::Live);

    let btc = &report.records["BTC"];
    let upbit = btc.upbit().expect("upbit leg").premium;
    let bithumb = btc.bithumb().expect("bithumb leg").premium;
    assert!(approx(upbit, 7.91, 0.01), "upbit premium {upbit}");
    assert!(approx(bithumb, 7.55, 0.01), "bithumb premium {bithumb}");

    let total = btc.total_volume_24h().expect("total volume present");
    assert!(approx(total, 15.0, 1e-4), "total volume {total}");
}

#[tokio::test]
async fn record_serializes_with_wire_names() {
    // Given: The BTC scenario
    let fixture = btc_scenario();

    // When: The report records are serialized
    let report = service(&fixture).all_premium_data().await;
    let json = serde_json::to_value(&report.records).expect("serializes");

    // Then: The record uses the camelCase wire keys
    let btc = &json["BTC"];
    assert_eq!(btc["upbit"], 150_000_000.0);
    assert_eq!(btc["bithumb"], 149_500_000.0);
    assert_eq!(btc["binance"], 100_000.0);
    assert_eq!(btc["exchangeRate"], 1390.0);
    assert_eq!(btc["upbitVolume24h"], 10.0);
    assert_eq!(btc["koreanName"], "비트코인");
    assert_eq!(btc["englishName"], "Bitcoin");
    assert!(btc["upbitPremium"].is_f64());
    assert!(btc["bithumbPremium"].is_f64());
}

#[tokio::test]
async fn volumes_from_both_domestic_exchanges_are_summed() {
    // Given: ETH with Upbit traded value 1000 and Bithumb 0.5 units at 1000 KRW
    let fixture = FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(upbit_market_all_url(), market_all(&[("KRW-ETH", "이더리움", "Ethereum")]))
        .with_json(upbit_ticker_url(&["ETH"]), upbit_tickers(&[("KRW-ETH", 2_000.0, 1_000.0)]))
        .with_json(bithumb_ticker_url(), bithumb_tickers(&[("ETH", "1000", "0.5")]))
        .with_json(bithumb_market_all_url(), market_all(&[]))
        .with_json(binance_exchange_info_url(), exchange_info(&["ETHUSDT"]))
        .with_json(binance_price_url("ETHUSDT"), binance_price("ETHUSDT", "1.0"));

    // When: The aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: The total is the plain sum of both exchanges
    let eth = &report.records["ETH"];
    assert_eq!(eth.upbit().and_then(|leg| leg.volume_24h), Some(1_000.0));
    assert_eq!(eth.bithumb().and_then(|leg| leg.volume_24h), Some(500.0));
    assert_eq!(eth.total_volume_24h(), Some(1_500.0));
}

// =============================================================================
// Pipeline: Inclusion Rules
// =============================================================================

#[tokio::test]
async fn asset_not_tradable_on_binance_never_appears() {
    // Given: Upbit lists BTC and a KRW-only asset that Binance does not trade
    let fixture = FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(
            upbit_market_all_url(),
            market_all(&[("KRW-BTC", "비트코인", "Bitcoin"), ("KRW-BORA", "보라", "BORA")]),
        )
        .with_json(
            upbit_ticker_url(&["BTC", "BORA"]),
            upbit_tickers(&[("KRW-BTC", 150_000_000.0, 10.0), ("KRW-BORA", 150.0, 3.0)]),
        )
        .with_json(bithumb_ticker_url(), bithumb_tickers(&[]))
        .with_json(bithumb_market_all_url(), market_all(&[]))
        .with_json(binance_exchange_info_url(), exchange_info(&["BTCUSDT"]))
        .with_json(binance_price_url("BTCUSDT"), binance_price("BTCUSDT", "100000"));

    // When: The aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: Only BTC is emitted and BORAUSDT was never requested
    assert_eq!(report.records.len(), 1);
    assert!(report.records.contains_key("BTC"));
    assert!(!report.records.contains_key("BORA"));
    assert_eq!(fixture.request_count(&binance_price_url("BORAUSDT")), 0);
}

#[tokio::test]
async fn usdt_is_priced_at_one_dollar_without_a_binance_request() {
    // Given: USDT trades on Upbit at 1400 KRW with a live rate of 1390
    let fixture = FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(upbit_market_all_url(), market_all(&[("KRW-USDT", "테더", "Tether")]))
        .with_json(upbit_ticker_url(&["USDT"]), upbit_tickers(&[("KRW-USDT", 1_400.0, 99.0)]))
        .with_json(bithumb_ticker_url(), bithumb_tickers(&[]))
        .with_json(bithumb_market_all_url(), market_all(&[]));

    // When: The aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: The international leg is exactly 1.0 and Binance was never contacted
    let usdt = &report.records["USDT"];
    assert_eq!(usdt.binance(), 1.0);
    let premium = usdt.upbit().expect("upbit leg").premium;
    assert!(approx(premium, (1_400.0 - 1_390.0) / 1_390.0 * 100.0, 1e-9));
    assert!(fixture
        .requests()
        .iter()
        .all(|request| !request.url.starts_with(BINANCE)));
}

#[tokio::test]
async fn metadata_prefers_upbit_names_and_falls_back_to_bithumb() {
    // Given: BTC named by both exchanges, XRP named only by Bithumb
    let fixture = FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(upbit_market_all_url(), market_all(&[("KRW-BTC", "비트코인", "Bitcoin")]))
        .with_json(upbit_ticker_url(&["BTC"]), upbit_tickers(&[("KRW-BTC", 150_000_000.0, 10.0)]))
        .with_json(
            bithumb_ticker_url(),
            bithumb_tickers(&[("BTC", "149500000", "1"), ("XRP", "900", "10")]),
        )
        .with_json(
            bithumb_market_all_url(),
            market_all(&[("KRW-BTC", "비트", "BTC (Bithumb)"), ("KRW-XRP", "리플", "XRP")]),
        )
        .with_json(binance_exchange_info_url(), exchange_info(&["BTCUSDT", "XRPUSDT"]))
        .with_json(binance_price_url("BTCUSDT"), binance_price("BTCUSDT", "100000"))
        .with_json(binance_price_url("XRPUSDT"), binance_price("XRPUSDT", "0.6"));

    // When: The aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: Upbit names win, Bithumb fills the gap
    let btc = report.records["BTC"].metadata().expect("btc names");
    assert_eq!(btc.english_name, "Bitcoin");
    let xrp = report.records["XRP"].metadata().expect("xrp names");
    assert_eq!(xrp.korean_name, "리플");
    assert!(report.records["XRP"].upbit().is_none());
}

// =============================================================================
// Pipeline: Reference Rate
// =============================================================================

#[tokio::test]
async fn fx_failure_falls_back_to_1390_and_still_produces_records() {
    // Given: The rate endpoint is down
    let fixture = btc_scenario().with_error(FX, HttpError::new("connection refused"));

    // When: The aggregation runs
    let report = service(&fixture).all_premium_data().await;

    // Then: The fallback rate is used, flagged, and records are still produced
    assert_eq!(report.exchange_rate.value(), 1390.0);
    assert!(report.exchange_rate.is_fallback());
    assert!(!report.records.is_empty());
    assert_eq!(report.records["BTC"].exchange_rate(), 1390.0);
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.code == "rate.fallback"));
}

#[tokio::test]
async fn single_coin_view_reports_missing_prices_as_absent() {
    // Given: BTC on Upbit and Binance, absent from Bithumb
    let fixture = FixtureHttpClient::new()
        .with_json(FX, fx_rate(1390.0))
        .with_json(upbit_ticker_url(&["BTC"]), upbit_tickers(&[("KRW-BTC", 150_000_000.0, 10.0)]))
        .with_json(bithumb_ticker_url(), bithumb_tickers(&[("ETH", "5000000", "1")]))
        .with_json(binance_exchange_info_url(), exchange_info(&["BTCUSDT"]))
        .with_json(binance_price_url("BTCUSDT"), binance_price("BTCUSDT", "100000"));

    // When: The single-asset view is requested
    let coin = kimp_core::AssetId::parse("btc").expect("valid");
    let view = service(&fixture).coin_premium(&coin).await;

    // Then: Upbit and Binance are present, Bithumb is null
    assert_eq!(view.upbit, Some(150_000_000.0));
    assert_eq!(view.bithumb, None);
    assert_eq!(view.binance, Some(100_000.0));
    assert!(view.upbit_premium.is_some_and(|value| approx(value, 7.91, 0.01)));

    let json = serde_json::to_value(&view).expect("serializes");
    assert_eq!(json["coin"], "BTC");
    assert!(json["bithumb"].is_null());
    assert_eq!(json["exchangeRate"], 1390.0);
}
