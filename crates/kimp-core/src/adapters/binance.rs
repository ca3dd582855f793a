use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::parse::number_field;
use crate::data_source::{
    Capabilities, FetchOutcome, MarketSource, SourceError, SourceFuture, SymbolScope,
};
use crate::http_client::{fetch_json, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::reconcile::to_international_pair;
use crate::{AssetId, ExchangeId, ListingBook, PriceBook, PricePoint};

/// Pairs assumed tradable when `exchangeInfo` cannot be fetched.
pub const FALLBACK_PAIRS: [&str; 9] = [
    "BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT", "AVAXUSDT", "DOTUSDT",
    "MATICUSDT",
];

const TRADING: &str = "TRADING";
const STABLE_PRICE: f64 = 1.0;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<Value>,
}

/// Binance spot client. Prices are quoted in USDT, one request per pair.
#[derive(Clone)]
pub struct BinanceClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    concurrency: usize,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl BinanceClient {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: 1,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::MIN))),
        }
        .with_pacing(8, 20)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Bound in-flight price requests and pace them at `requests_per_second`.
    pub fn with_pacing(mut self, concurrency: usize, requests_per_second: u32) -> Self {
        self.concurrency = concurrency.max(1);
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        self.limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));
        self
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url)).with_timeout_ms(self.timeout_ms)
    }

    /// Symbols currently in `TRADING` status. A body without a `symbols`
    /// array (rate-limit or error objects) is malformed.
    pub async fn tradable_pairs(&self) -> Result<HashSet<String>, SourceError> {
        let info: ExchangeInfo = fetch_json(
            self.http_client.as_ref(),
            self.request("/api/v3/exchangeInfo"),
            "binance exchangeInfo",
        )
        .await?;

        Ok(info
            .symbols
            .iter()
            .filter(|entry| entry.get("status").and_then(Value::as_str) == Some(TRADING))
            .filter_map(|entry| entry.get("symbol")?.as_str().map(str::to_owned))
            .collect())
    }

    /// Tradable pairs, or [`FALLBACK_PAIRS`] together with the cause.
    async fn pairs_or_fallback(&self) -> (HashSet<String>, Option<SourceError>) {
        match self.tradable_pairs().await {
            Ok(pairs) => (pairs, None),
            Err(error) => {
                warn!(%error, "binance exchangeInfo unavailable, using fallback pairs");
                let pairs = FALLBACK_PAIRS.iter().map(|pair| (*pair).to_owned()).collect();
                (
                    pairs,
                    Some(error.context("binance exchangeInfo unavailable, priced fallback pairs")),
                )
            }
        }
    }

    async fn pair_price(&self, id: AssetId, pair: String) -> Result<PricePoint, SourceError> {
        self.limiter.until_ready().await;

        let path = format!("/api/v3/ticker/price?symbol={}", urlencoding::encode(&pair));
        let payload: Value =
            fetch_json(self.http_client.as_ref(), self.request(&path), "binance ticker").await?;

        let price = payload.get("price").and_then(number_field).ok_or_else(|| {
            SourceError::malformed(format!("binance ticker for {pair} has no price"))
        })?;

        PricePoint::new(id, price, None).map_err(|error| {
            SourceError::malformed(format!("binance ticker for {pair} is invalid: {error}"))
        })
    }

    async fn fetch_prices(&self, scope: SymbolScope) -> FetchOutcome<PriceBook> {
        let ids = match scope {
            SymbolScope::All => {
                return FetchOutcome::Failed(SourceError::unsupported_scope(
                    ExchangeId::Binance,
                    "wildcard price lookup",
                ))
            }
            SymbolScope::Only(ids) => ids,
        };

        let mut book = PriceBook::new();
        let mut queued = Vec::new();
        let mut tradable: Option<HashSet<String>> = None;
        let mut fallback = None;

        for id in ids {
            if id.is_stable() {
                match PricePoint::new(id.clone(), STABLE_PRICE, None) {
                    Ok(point) => {
                        book.insert(id, point);
                    }
                    Err(error) => warn!(%error, "stable asset price rejected"),
                }
                continue;
            }

            if tradable.is_none() {
                let (pairs, cause) = self.pairs_or_fallback().await;
                tradable = Some(pairs);
                fallback = cause;
            }
            let pair = to_international_pair(&id);
            if tradable.as_ref().is_some_and(|pairs| pairs.contains(&pair)) {
                queued.push((id, pair));
            } else {
                debug!(symbol = %id, "not tradable on binance");
            }
        }

        let attempted = queued.len();
        let results: Vec<(AssetId, Result<PricePoint, SourceError>)> = stream::iter(queued)
            .map(|(id, pair)| async move { (id.clone(), self.pair_price(id, pair).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut last_error = None;
        let mut failed = 0;
        for (id, result) in results {
            match result {
                Ok(point) => {
                    book.insert(id, point);
                }
                Err(error) => {
                    warn!(symbol = %id, %error, "binance price lookup failed");
                    failed += 1;
                    last_error = Some(error);
                }
            }
        }

        let outcome = match last_error {
            Some(error) if attempted > 0 && failed == attempted && book.is_empty() => {
                FetchOutcome::Failed(error)
            }
            _ => FetchOutcome::from_map(book),
        };
        outcome.degraded_by(fallback)
    }
}

impl MarketSource for BinanceClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::per_symbol()
    }

    fn prices<'a>(&'a self, scope: SymbolScope) -> SourceFuture<'a, FetchOutcome<PriceBook>> {
        Box::pin(self.fetch_prices(scope))
    }

    fn listing<'a>(&'a self) -> SourceFuture<'a, FetchOutcome<ListingBook>> {
        Box::pin(async move {
            FetchOutcome::Failed(SourceError::unsupported_scope(
                ExchangeId::Binance,
                "market listing",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::FixtureHttpClient;

    const BASE: &str = "https://binance.test";

    fn ids(raw: &[&str]) -> SymbolScope {
        SymbolScope::only(raw.iter().map(|symbol| AssetId::parse(symbol).expect("valid")))
    }

    fn client(fixture: &FixtureHttpClient) -> BinanceClient {
        BinanceClient::new(Arc::new(fixture.clone()), BASE).with_pacing(4, 1_000)
    }

    #[tokio::test]
    async fn usdt_is_pinned_without_any_request() {
        let fixture = FixtureHttpClient::new();

        let book = client(&fixture).prices(ids(&["USDT"])).await.into_map();

        assert_eq!(book["USDT"].price, 1.0);
        assert!(fixture.requests().is_empty());
    }

    #[tokio::test]
    async fn only_trading_pairs_are_queried() {
        let fixture = FixtureHttpClient::new()
            .with_json(
                format!("{BASE}/api/v3/exchangeInfo"),
                r#"{"symbols":[
                    {"symbol":"BTCUSDT","status":"TRADING"},
                    {"symbol":"LUNAUSDT","status":"BREAK"}
                ]}"#,
            )
            .with_json(
                format!("{BASE}/api/v3/ticker/price?symbol=BTCUSDT"),
                r#"{"symbol":"BTCUSDT","price":"100000.00"}"#,
            );

        let outcome = client(&fixture).prices(ids(&["BTC", "LUNA", "KRWONLY"])).await;
        assert!(outcome.error().is_none());

        let book = outcome.into_map();
        assert_eq!(book.len(), 1);
        assert_eq!(book["BTC"].price, 100_000.0);
        assert_eq!(fixture.requests().len(), 2);
    }

    #[tokio::test]
    async fn exchange_info_failure_uses_fallback_pairs() {
        let fixture = FixtureHttpClient::new()
            .with_status(format!("{BASE}/api/v3/exchangeInfo"), 418, "")
            .with_json(
                format!("{BASE}/api/v3/ticker/price?symbol=ETHUSDT"),
                r#"{"symbol":"ETHUSDT","price":"3000"}"#,
            );

        let outcome = client(&fixture).prices(ids(&["ETH", "PEPE"])).await;
        assert_eq!(outcome.error().map(SourceError::kind), Some(SourceErrorKind::Unavailable));

        let book = outcome.into_map();
        assert_eq!(book.len(), 1);
        assert_eq!(book["ETH"].price, 3000.0);
    }

    #[tokio::test]
    async fn exchange_info_without_symbols_uses_fallback_pairs() {
        let fixture = FixtureHttpClient::new()
            .with_json(
                format!("{BASE}/api/v3/exchangeInfo"),
                r#"{"code":-1003,"msg":"Too many requests"}"#,
            )
            .with_json(
                format!("{BASE}/api/v3/ticker/price?symbol=BTCUSDT"),
                r#"{"symbol":"BTCUSDT","price":"100000"}"#,
            );

        let outcome = client(&fixture).prices(ids(&["BTC"])).await;

        let error = outcome.error().expect("fallback is reported");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
        assert!(error.message().starts_with("binance exchangeInfo unavailable"));
        let book = outcome.into_map();
        assert_eq!(book["BTC"].price, 100_000.0);
    }

    #[tokio::test]
    async fn wildcard_scope_is_rejected() {
        let outcome = client(&FixtureHttpClient::new()).prices(SymbolScope::All).await;
        assert_eq!(
            outcome.error().map(SourceError::kind),
            Some(SourceErrorKind::UnsupportedScope)
        );
    }
}
