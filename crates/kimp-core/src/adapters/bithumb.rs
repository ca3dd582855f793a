use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::parse::{krw_listing, number_field};
use crate::data_source::{
    Capabilities, FetchOutcome, MarketSource, SourceError, SourceFuture, SymbolScope,
};
use crate::http_client::{fetch_json, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{AssetId, ExchangeId, ListingBook, PriceBook, PricePoint};

const STATUS_OK: &str = "0000";
/// Non-asset key Bithumb mixes into the ticker map.
const TIMESTAMP_KEY: &str = "date";

/// Bithumb KRW market client.
#[derive(Clone)]
pub struct BithumbClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct TickerEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl BithumbClient {
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

    async fn ticker_all(&self) -> Result<Map<String, Value>, SourceError> {
        let envelope: TickerEnvelope = fetch_json(
            self.http_client.as_ref(),
            self.request("/public/ticker/ALL_KRW"),
            "bithumb ticker",
        )
        .await?;

        if envelope.status != STATUS_OK {
            return Err(SourceError::malformed(format!(
                "bithumb ticker returned status {}{}",
                envelope.status,
                envelope
                    .message
                    .map(|message| format!(": {message}"))
                    .unwrap_or_default()
            )));
        }

        match envelope.data {
            Value::Object(data) => Ok(data),
            _ => Err(SourceError::malformed("bithumb ticker data is not an object")),
        }
    }

    async fn fetch_prices(&self, scope: SymbolScope) -> FetchOutcome<PriceBook> {
        let data = match self.ticker_all().await {
            Ok(data) => data,
            Err(error) => return FetchOutcome::Failed(error),
        };

        let book = data
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(TIMESTAMP_KEY))
            .filter_map(|(key, entry)| normalize_ticker(key, entry))
            .filter(|point| scope.contains(&point.symbol))
            .map(|point| (point.symbol.clone(), point))
            .collect();

        FetchOutcome::from_map(book)
    }
}

/// Price is `closing_price`; volume is `units_traded_24H` valued at that price.
fn normalize_ticker(key: &str, entry: &Value) -> Option<PricePoint> {
    let symbol = AssetId::parse(key).ok()?;
    let Some(price) = entry.get("closing_price").and_then(number_field) else {
        debug!(symbol = key, "skipping bithumb ticker without closing price");
        return None;
    };
    let volume = entry
        .get("units_traded_24H")
        .and_then(number_field)
        .map(|units| units * price)
        .filter(|volume| volume.is_finite() && *volume >= 0.0);

    PricePoint::new(symbol, price, volume).ok()
}

impl MarketSource for BithumbClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Bithumb
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::domestic()
    }

    fn prices<'a>(&'a self, scope: SymbolScope) -> SourceFuture<'a, FetchOutcome<PriceBook>> {
        Box::pin(self.fetch_prices(scope))
    }

    fn listing<'a>(&'a self) -> SourceFuture<'a, FetchOutcome<ListingBook>> {
        Box::pin(async move {
            let entries: Result<Vec<Value>, SourceError> = fetch_json(
                self.http_client.as_ref(),
                self.request("/v1/market/all"),
                "bithumb market list",
            )
            .await;

            match entries {
                Ok(entries) => FetchOutcome::from_map(krw_listing(entries)),
                Err(error) => FetchOutcome::Failed(error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::FixtureHttpClient;

    const TICKER_URL: &str = "https://bithumb.test/public/ticker/ALL_KRW";

    fn client(fixture: &FixtureHttpClient) -> BithumbClient {
        BithumbClient::new(Arc::new(fixture.clone()), "https://bithumb.test")
    }

    #[test]
    fn volume_is_units_times_closing_price() {
        let point = normalize_ticker(
            "BTC",
            &json!({"closing_price": "1000", "units_traded_24H": "0.5"}),
        )
        .expect("normalizes");

        assert_eq!(point.price, 1000.0);
        assert_eq!(point.volume_24h, Some(500.0));
    }

    #[test]
    fn unparsable_units_leave_volume_absent() {
        let ticker = json!({"closing_price": "3000", "units_traded_24H": "-"});
        let point = normalize_ticker("ETH", &ticker).expect("price still valid");
        assert_eq!(point.volume_24h, None);
    }

    #[tokio::test]
    async fn skips_date_key_and_filters_scope() {
        let fixture = FixtureHttpClient::new().with_json(
            TICKER_URL,
            r#"{"status":"0000","data":{
                "BTC":{"closing_price":"149500000","units_traded_24H":"0.00000003"},
                "XRP":{"closing_price":"800"},
                "date":"1717000000000"
            }}"#,
        );

        let all = client(&fixture).prices(SymbolScope::All).await.into_map();
        assert_eq!(all.len(), 2);
        assert!(!all.contains_key("DATE"));

        let only = client(&fixture)
            .prices(SymbolScope::only([AssetId::parse("xrp").expect("valid")]))
            .await
            .into_map();
        assert_eq!(only.len(), 1);
        assert_eq!(only["XRP"].price, 800.0);
    }

    #[tokio::test]
    async fn rejects_non_success_status() {
        let fixture = FixtureHttpClient::new().with_json(
            TICKER_URL,
            r#"{"status":"5600","message":"maintenance"}"#,
        );

        let outcome = client(&fixture).prices(SymbolScope::All).await;
        let error = outcome.error().expect("failed outcome");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
        assert!(error.message().contains("5600"));
    }
}
