use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AssetId, ValidationError};

/// KRW per USD used whenever the live reference rate cannot be obtained.
pub const FALLBACK_KRW_PER_USD: f64 = 1390.0;

/// Normalized prices from one exchange, keyed by asset.
pub type PriceBook = HashMap<AssetId, PricePoint>;

/// Display names from one exchange's market listing, keyed by asset.
pub type ListingBook = HashMap<AssetId, AssetMetadata>;

/// Last traded price of one asset on one exchange.
///
/// Prices are in the exchange's quote currency (KRW domestically, USDT on
/// Binance). Volume is the 24h traded value in that same currency; `None`
/// means the exchange did not report it, which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: AssetId,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
}

impl PricePoint {
    pub fn new(
        symbol: AssetId,
        price: f64,
        volume_24h: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_positive("price", price)?;
        validate_optional_non_negative("volume_24h", volume_24h)?;

        Ok(Self {
            symbol,
            price,
            volume_24h,
        })
    }
}

/// Korean and English display names of a listed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub symbol: AssetId,
    pub korean_name: String,
    pub english_name: String,
}

impl AssetMetadata {
    pub fn new(
        symbol: AssetId,
        korean_name: impl Into<String>,
        english_name: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            korean_name: korean_name.into(),
            english_name: english_name.into(),
        }
    }
}

/// Where an [`ExchangeRate`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    Fallback,
}

impl RateOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

/// USD to KRW reference rate. Always present and always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    value: f64,
    origin: RateOrigin,
}

impl ExchangeRate {
    pub fn live(value: f64) -> Result<Self, ValidationError> {
        validate_positive("exchange_rate", value)?;
        Ok(Self {
            value,
            origin: RateOrigin::Live,
        })
    }

    /// Substitute rate. Non-positive input is replaced by [`FALLBACK_KRW_PER_USD`].
    pub fn fallback(value: f64) -> Self {
        let value = if value.is_finite() && value > 0.0 {
            value
        } else {
            FALLBACK_KRW_PER_USD
        };
        Self {
            value,
            origin: RateOrigin::Fallback,
        }
    }

    pub const fn value(self) -> f64 {
        self.value
    }

    pub const fn origin(self) -> RateOrigin {
        self.origin
    }

    pub fn is_fallback(self) -> bool {
        self.origin == RateOrigin::Fallback
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::fallback(FALLBACK_KRW_PER_USD)
    }
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

pub(crate) fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}
