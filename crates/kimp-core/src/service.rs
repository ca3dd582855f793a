//! Premium pipeline entry point.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{BinanceClient, BithumbClient, ExchangeRateClient, UpbitClient};
use crate::aggregate::{join_premiums, JoinInputs, PremiumTable};
use crate::data_source::{FetchOutcome, MarketSource, RateSource, SourceError, SymbolScope};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::reconcile::reconcile;
use crate::retry::RetryingHttpClient;
use crate::{AssetId, CoinPremium, ExchangeId, ExchangeRate, PriceBook, UtcDateTime};
use crate::{CoreError, UpstreamConfig};

/// Non-fatal problem observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchWarning {
    pub source: String,
    pub code: &'static str,
    pub message: String,
}

impl FetchWarning {
    fn new(source: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            code,
            message: message.into(),
        }
    }
}

/// Output of one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumReport {
    pub records: PremiumTable,
    pub exchange_rate: ExchangeRate,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    pub warnings: Vec<FetchWarning>,
}

/// Fetches, reconciles and joins the three exchanges with the reference rate.
///
/// Holds no per-request state; concurrent calls are independent.
#[derive(Clone)]
pub struct PremiumService {
    upbit: Arc<dyn MarketSource>,
    bithumb: Arc<dyn MarketSource>,
    binance: Arc<dyn MarketSource>,
    rates: Arc<dyn RateSource>,
}

impl PremiumService {
    pub fn new(
        upbit: Arc<dyn MarketSource>,
        bithumb: Arc<dyn MarketSource>,
        binance: Arc<dyn MarketSource>,
        rates: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            upbit,
            bithumb,
            binance,
            rates,
        }
    }

    /// Wire the standard clients onto `http_client`, wrapped with retries.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &UpstreamConfig) -> Self {
        let http: Arc<dyn HttpClient> =
            Arc::new(RetryingHttpClient::new(http_client, config.retry.clone()));
        let timeout_ms = config.timeout_ms;

        Self::new(
            Arc::new(
                UpbitClient::new(Arc::clone(&http), config.upbit_base_url.as_str())
                    .with_timeout_ms(timeout_ms),
            ),
            Arc::new(
                BithumbClient::new(Arc::clone(&http), config.bithumb_base_url.as_str())
                    .with_timeout_ms(timeout_ms),
            ),
            Arc::new(
                BinanceClient::new(Arc::clone(&http), config.binance_base_url.as_str())
                    .with_timeout_ms(timeout_ms)
                    .with_pacing(config.binance_concurrency, config.binance_requests_per_second),
            ),
            Arc::new(
                ExchangeRateClient::new(http, config.fx_url.as_str())
                    .with_timeout_ms(timeout_ms)
                    .with_fallback(config.fallback_rate),
            ),
        )
    }

    /// Service over the public endpoints via reqwest.
    pub fn live(config: &UpstreamConfig) -> Result<Self, CoreError> {
        let config = config.clone().validate()?;
        Ok(Self::from_config(Arc::new(ReqwestHttpClient::new()), &config))
    }

    fn source(&self, exchange: ExchangeId) -> &Arc<dyn MarketSource> {
        match exchange {
            ExchangeId::Upbit => &self.upbit,
            ExchangeId::Bithumb => &self.bithumb,
            ExchangeId::Binance => &self.binance,
        }
    }

    /// Premium records for every asset listed on Binance and at least one
    /// domestic exchange. Upstream failures degrade the result, never fail it.
    pub async fn all_premium_data(&self) -> PremiumReport {
        let started = Instant::now();
        let mut warnings = Vec::new();

        let (exchange_rate, upbit, bithumb, upbit_listing, bithumb_listing) = tokio::join!(
            self.rates.rate(),
            self.upbit.prices(SymbolScope::All),
            self.bithumb.prices(SymbolScope::All),
            self.upbit.listing(),
            self.bithumb.listing(),
        );

        if exchange_rate.is_fallback() {
            warnings.push(FetchWarning::new(
                "exchange_rate",
                "rate.fallback",
                format!("live USD/KRW rate unavailable, using {}", exchange_rate.value()),
            ));
        }

        let upbit = settle(ExchangeId::Upbit, "prices", upbit, &mut warnings);
        let bithumb = settle(ExchangeId::Bithumb, "prices", bithumb, &mut warnings);
        let upbit_listing = settle(ExchangeId::Upbit, "listing", upbit_listing, &mut warnings);
        let bithumb_listing =
            settle(ExchangeId::Bithumb, "listing", bithumb_listing, &mut warnings);

        let universe: BTreeSet<AssetId> = reconcile(upbit.keys(), bithumb.keys());
        let binance = if universe.is_empty() {
            PriceBook::new()
        } else {
            let outcome = self
                .binance
                .prices(SymbolScope::Only(universe.clone()))
                .await;
            settle(ExchangeId::Binance, "prices", outcome, &mut warnings)
        };

        let records = join_premiums(&JoinInputs {
            exchange_rate,
            universe: &universe,
            upbit: &upbit,
            bithumb: &bithumb,
            binance: &binance,
            upbit_listing: &upbit_listing,
            bithumb_listing: &bithumb_listing,
        });

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            universe = universe.len(),
            upbit = upbit.len(),
            bithumb = bithumb.len(),
            binance = binance.len(),
            records = records.len(),
            krw_per_usd = exchange_rate.value(),
            latency_ms,
            "premium aggregation complete"
        );

        PremiumReport {
            records,
            exchange_rate,
            generated_at: UtcDateTime::now(),
            latency_ms,
            warnings,
        }
    }

    pub async fn exchange_rate(&self) -> ExchangeRate {
        self.rates.rate().await
    }

    /// Upbit prices for `ids`; unknown assets are absent.
    pub async fn upbit_prices(&self, ids: &[AssetId]) -> FetchOutcome<PriceBook> {
        self.scoped_prices(ExchangeId::Upbit, ids).await
    }

    /// Full Bithumb KRW book.
    pub async fn bithumb_prices(&self) -> FetchOutcome<PriceBook> {
        self.bithumb.prices(SymbolScope::All).await
    }

    /// Binance USDT prices for `ids`; untradable assets are absent.
    pub async fn binance_prices(&self, ids: &[AssetId]) -> FetchOutcome<PriceBook> {
        self.scoped_prices(ExchangeId::Binance, ids).await
    }

    /// Prices from one exchange. An empty `ids` means every listed asset, which
    /// only exchanges with wildcard support accept.
    pub async fn prices(&self, exchange: ExchangeId, ids: &[AssetId]) -> FetchOutcome<PriceBook> {
        let source = self.source(exchange);
        if !ids.is_empty() {
            return self.scoped_prices(exchange, ids).await;
        }
        if source.capabilities().wildcard_prices {
            source.prices(SymbolScope::All).await
        } else {
            FetchOutcome::Failed(SourceError::invalid_request(format!(
                "{exchange} prices need at least one asset"
            )))
        }
    }

    async fn scoped_prices(
        &self,
        exchange: ExchangeId,
        ids: &[AssetId],
    ) -> FetchOutcome<PriceBook> {
        if ids.is_empty() {
            return FetchOutcome::Empty;
        }
        let scope = SymbolScope::only(ids.iter().cloned());
        self.source(exchange).prices(scope).await
    }

    /// Single-asset view with whatever prices are available.
    pub async fn coin_premium(&self, id: &AssetId) -> CoinPremium {
        let only = || SymbolScope::only([id.clone()]);
        let (upbit, bithumb, binance, exchange_rate) = tokio::join!(
            self.upbit.prices(only()),
            self.bithumb.prices(only()),
            self.binance.prices(only()),
            self.rates.rate(),
        );

        let price = |outcome: FetchOutcome<PriceBook>| {
            outcome.into_map().remove(id).map(|point| point.price)
        };

        CoinPremium::new(
            id.clone(),
            price(upbit),
            price(bithumb),
            price(binance),
            exchange_rate.value(),
        )
    }
}

/// Unwrap a fetch outcome, recording failures and fallbacks as warnings.
fn settle<T: Default>(
    exchange: ExchangeId,
    what: &str,
    outcome: FetchOutcome<T>,
    warnings: &mut Vec<FetchWarning>,
) -> T {
    let (value, error) = match outcome {
        FetchOutcome::Fetched(value) => return value,
        FetchOutcome::Empty => return T::default(),
        FetchOutcome::Failed(error) => {
            warn!(exchange = %exchange, what, %error, "source failed, treating as empty");
            (T::default(), error)
        }
        FetchOutcome::Fallback(value, error) => (value, error),
    };

    warnings.push(FetchWarning::new(
        format!("{exchange}.{what}"),
        error.code(),
        error.message(),
    ));
    value
}
