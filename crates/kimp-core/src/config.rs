//! Upstream endpoints and pacing, with `KIMP_*` environment overrides.

use std::str::FromStr;

use crate::{CoreError, RetryConfig, FALLBACK_KRW_PER_USD};

pub const DEFAULT_UPBIT_BASE_URL: &str = "https://api.upbit.com";
pub const DEFAULT_BITHUMB_BASE_URL: &str = "https://api.bithumb.com";
pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_FX_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Connection settings shared by every client of one [`PremiumService`](crate::PremiumService).
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    pub upbit_base_url: String,
    pub bithumb_base_url: String,
    pub binance_base_url: String,
    /// Full URL of the USD reference-rate document.
    pub fx_url: String,
    pub timeout_ms: u64,
    /// In-flight Binance price requests.
    pub binance_concurrency: usize,
    pub binance_requests_per_second: u32,
    pub fallback_rate: f64,
    pub retry: RetryConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            upbit_base_url: DEFAULT_UPBIT_BASE_URL.to_owned(),
            bithumb_base_url: DEFAULT_BITHUMB_BASE_URL.to_owned(),
            binance_base_url: DEFAULT_BINANCE_BASE_URL.to_owned(),
            fx_url: DEFAULT_FX_URL.to_owned(),
            timeout_ms: crate::http_client::DEFAULT_TIMEOUT_MS,
            binance_concurrency: 8,
            binance_requests_per_second: 20,
            fallback_rate: FALLBACK_KRW_PER_USD,
            retry: RetryConfig::exponential(1),
        }
    }
}

impl UpstreamConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(|value| (key, value))
        };

        if let Some((_, value)) = read("KIMP_UPBIT_BASE_URL") {
            self.upbit_base_url = value;
        }
        if let Some((_, value)) = read("KIMP_BITHUMB_BASE_URL") {
            self.bithumb_base_url = value;
        }
        if let Some((_, value)) = read("KIMP_BINANCE_BASE_URL") {
            self.binance_base_url = value;
        }
        if let Some((_, value)) = read("KIMP_FX_URL") {
            self.fx_url = value;
        }
        if let Some((key, value)) = read("KIMP_TIMEOUT_MS") {
            self.timeout_ms = parse_value(key, &value)?;
        }
        if let Some((key, value)) = read("KIMP_BINANCE_CONCURRENCY") {
            self.binance_concurrency = parse_value(key, &value)?;
        }
        if let Some((key, value)) = read("KIMP_BINANCE_RPS") {
            self.binance_requests_per_second = parse_value(key, &value)?;
        }
        if let Some((key, value)) = read("KIMP_FALLBACK_RATE") {
            self.fallback_rate = parse_value(key, &value)?;
        }
        if let Some((key, value)) = read("KIMP_MAX_RETRIES") {
            self.retry.max_retries = parse_value(key, &value)?;
            self.retry.enabled = self.retry.max_retries > 0;
        }

        self.validate()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, CoreError> {
        self.timeout_ms = timeout_ms;
        self.validate()
    }

    /// Check ranges and strip trailing slashes from base URLs.
    pub fn validate(mut self) -> Result<Self, CoreError> {
        for (key, url) in [
            ("KIMP_UPBIT_BASE_URL", &mut self.upbit_base_url),
            ("KIMP_BITHUMB_BASE_URL", &mut self.bithumb_base_url),
            ("KIMP_BINANCE_BASE_URL", &mut self.binance_base_url),
            ("KIMP_FX_URL", &mut self.fx_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::config(key, url.as_str(), "expected an http(s) URL"));
            }
            let trimmed_len = url.trim_end_matches('/').len();
            url.truncate(trimmed_len);
        }

        if self.timeout_ms == 0 {
            return Err(CoreError::config("KIMP_TIMEOUT_MS", "0", "must be greater than zero"));
        }
        if self.binance_concurrency == 0 {
            return Err(CoreError::config(
                "KIMP_BINANCE_CONCURRENCY",
                "0",
                "must be greater than zero",
            ));
        }
        if self.binance_requests_per_second == 0 {
            return Err(CoreError::config("KIMP_BINANCE_RPS", "0", "must be greater than zero"));
        }
        if !self.fallback_rate.is_finite() || self.fallback_rate <= 0.0 {
            return Err(CoreError::config(
                "KIMP_FALLBACK_RATE",
                self.fallback_rate.to_string(),
                "must be a positive number",
            ));
        }

        Ok(self)
    }
}

fn parse_value<T>(key: &'static str, value: &str) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|error: T::Err| CoreError::config(key, value, error.to_string()))
}
