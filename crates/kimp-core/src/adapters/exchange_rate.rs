use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::parse::number_field;
use crate::data_source::{RateSource, SourceError, SourceFuture};
use crate::http_client::{fetch_json, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{ExchangeRate, FALLBACK_KRW_PER_USD};

/// USD reference-rate client reading `rates.KRW`.
#[derive(Clone)]
pub struct ExchangeRateClient {
    http_client: Arc<dyn HttpClient>,
    url: String,
    timeout_ms: u64,
    fallback: f64,
}

impl ExchangeRateClient {
    pub fn new(http_client: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            fallback: FALLBACK_KRW_PER_USD,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    /// Live rate only; every failure is returned to the caller.
    pub async fn fetch_live(&self) -> Result<ExchangeRate, SourceError> {
        let payload: Value = fetch_json(
            self.http_client.as_ref(),
            HttpRequest::get(self.url.as_str()).with_timeout_ms(self.timeout_ms),
            "exchange rate",
        )
        .await?;

        let krw = payload
            .get("rates")
            .and_then(|rates| rates.get("KRW"))
            .and_then(number_field)
            .ok_or_else(|| SourceError::malformed("exchange rate payload has no rates.KRW"))?;

        ExchangeRate::live(krw)
            .map_err(|error| SourceError::malformed(format!("exchange rate rejected: {error}")))
    }
}

impl RateSource for ExchangeRateClient {
    fn rate<'a>(&'a self) -> SourceFuture<'a, ExchangeRate> {
        Box::pin(async move {
            match self.fetch_live().await {
                Ok(rate) => {
                    debug!(krw_per_usd = rate.value(), "exchange rate fetched");
                    rate
                }
                Err(error) => {
                    let rate = ExchangeRate::fallback(self.fallback);
                    warn!(
                        %error,
                        fallback = rate.value(),
                        "exchange rate unavailable, using fallback"
                    );
                    rate
                }
            }
        })
    }
}
