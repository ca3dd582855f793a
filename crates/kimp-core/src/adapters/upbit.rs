use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use super::parse::{krw_listing, krw_markets, number_field};
use crate::data_source::{
    Capabilities, FetchOutcome, MarketSource, SourceError, SourceFuture, SymbolScope,
};
use crate::http_client::{fetch_json, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::reconcile::{domestic_market, domestic_market_symbol};
use crate::{AssetId, ExchangeId, ListingBook, PriceBook, PricePoint};

/// Most markets Upbit accepts in one ticker query.
const TICKER_BATCH: usize = 100;

/// Assets priced when the market list cannot be fetched.
pub const FALLBACK_MARKETS: [&str; 10] = [
    "BTC", "ETH", "USDT", "SOL", "XRP", "ADA", "DOGE", "AVAX", "DOT", "MATIC",
];

/// Upbit KRW market client.
#[derive(Clone)]
pub struct UpbitClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl UpbitClient {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url)).with_timeout_ms(self.timeout_ms)
    }

    async fn market_entries(&self) -> Result<Vec<Value>, SourceError> {
        fetch_json(
            self.http_client.as_ref(),
            self.request("/v1/market/all"),
            "upbit market list",
        )
        .await
    }

    /// Every KRW market, in listing order.
    pub async fn market_list(&self) -> Result<Vec<AssetId>, SourceError> {
        self.market_entries()
            .await
            .map(|entries| krw_markets(&entries))
    }

    /// The market list, or [`FALLBACK_MARKETS`] together with the cause.
    async fn markets_or_fallback(&self) -> (Vec<AssetId>, Option<SourceError>) {
        match self.market_list().await {
            Ok(ids) => (ids, None),
            Err(error) => {
                warn!(%error, "upbit market list unavailable, using fallback markets");
                let ids = FALLBACK_MARKETS
                    .iter()
                    .filter_map(|symbol| AssetId::parse(symbol).ok())
                    .collect();
                (
                    ids,
                    Some(error.context("upbit market list unavailable, priced fallback markets")),
                )
            }
        }
    }

    async fn ticker_batch(&self, ids: &[AssetId]) -> Result<Vec<PricePoint>, SourceError> {
        let markets = ids.iter().map(domestic_market).collect::<Vec<_>>().join(",");
        let entries: Vec<Value> = fetch_json(
            self.http_client.as_ref(),
            self.request(&format!("/v1/ticker?markets={markets}")),
            "upbit ticker",
        )
        .await?;

        Ok(entries.iter().filter_map(normalize_ticker).collect())
    }

    async fn fetch_prices(&self, scope: SymbolScope) -> FetchOutcome<PriceBook> {
        let (ids, fallback) = match scope {
            SymbolScope::All => self.markets_or_fallback().await,
            SymbolScope::Only(ids) => (ids.into_iter().collect::<Vec<_>>(), None),
        };
        if ids.is_empty() {
            return FetchOutcome::Empty.degraded_by(fallback);
        }

        let batches = ids.chunks(TICKER_BATCH).map(|chunk| self.ticker_batch(chunk));
        let results = join_all(batches).await;

        let mut book = PriceBook::new();
        let mut succeeded = false;
        let mut last_error = None;
        for result in results {
            match result {
                Ok(points) => {
                    succeeded = true;
                    book.extend(points.into_iter().map(|point| (point.symbol.clone(), point)));
                }
                Err(error) => {
                    warn!(%error, "upbit ticker batch failed");
                    last_error = Some(error);
                }
            }
        }

        let outcome = match last_error {
            Some(error) if !succeeded => FetchOutcome::Failed(error),
            _ => FetchOutcome::from_map(book),
        };
        outcome.degraded_by(fallback)
    }
}

fn normalize_ticker(entry: &Value) -> Option<PricePoint> {
    let market = entry.get("market")?.as_str()?;
    let symbol = domestic_market_symbol(market)?;
    let price = entry.get("trade_price").and_then(number_field);
    let volume = entry
        .get("acc_trade_price_24h")
        .and_then(number_field)
        .filter(|volume| *volume >= 0.0);

    match price.map(|price| PricePoint::new(symbol, price, volume)) {
        Some(Ok(point)) => Some(point),
        _ => {
            debug!(market, "skipping upbit ticker without a usable price");
            None
        }
    }
}

impl MarketSource for UpbitClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Upbit
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::domestic()
    }

    fn prices<'a>(&'a self, scope: SymbolScope) -> SourceFuture<'a, FetchOutcome<PriceBook>> {
        Box::pin(self.fetch_prices(scope))
    }

    fn listing<'a>(&'a self) -> SourceFuture<'a, FetchOutcome<ListingBook>> {
        Box::pin(async move {
            match self.market_entries().await {
                Ok(entries) => FetchOutcome::from_map(krw_listing(entries)),
                Err(error) => FetchOutcome::Failed(error),
            }
        })
    }
}
