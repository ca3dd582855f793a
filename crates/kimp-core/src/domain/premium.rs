use serde::{Deserialize, Serialize};

use crate::domain::models::{validate_optional_non_negative, validate_positive};
use crate::{AssetId, AssetMetadata, ValidationError};

/// Percentage gap between a KRW domestic price and a USD international price
/// converted at `rate` KRW per USD.
///
/// Returns `0.0` whenever any input is exactly zero.
pub fn premium(domestic: f64, international: f64, rate: f64) -> f64 {
    if domestic == 0.0 || international == 0.0 || rate == 0.0 {
        return 0.0;
    }

    let converted = international * rate;
    ((domestic - converted) / converted) * 100.0
}

/// One domestic exchange's contribution to a [`PremiumRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomesticLeg {
    pub price: f64,
    pub premium: f64,
    pub volume_24h: Option<f64>,
}

impl DomesticLeg {
    pub fn priced(
        price: f64,
        volume_24h: Option<f64>,
        international: f64,
        rate: f64,
    ) -> Result<Self, ValidationError> {
        validate_positive("domestic_price", price)?;
        validate_optional_non_negative("volume_24h", volume_24h)?;

        Ok(Self {
            price,
            premium: premium(price, international, rate),
            volume_24h,
        })
    }
}

/// Joined per-asset view across both domestic exchanges and Binance.
///
/// At least one of `upbit` / `bithumb` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PremiumRecordWire", try_from = "PremiumRecordWire")]
pub struct PremiumRecord {
    symbol: AssetId,
    upbit: Option<DomesticLeg>,
    bithumb: Option<DomesticLeg>,
    binance: f64,
    exchange_rate: f64,
    total_volume_24h: Option<f64>,
    metadata: Option<AssetMetadata>,
}

impl PremiumRecord {
    pub fn new(
        symbol: AssetId,
        binance: f64,
        exchange_rate: f64,
        upbit: Option<DomesticLeg>,
        bithumb: Option<DomesticLeg>,
    ) -> Result<Self, ValidationError> {
        validate_positive("binance", binance)?;
        validate_positive("exchange_rate", exchange_rate)?;

        if upbit.is_none() && bithumb.is_none() {
            return Err(ValidationError::MissingDomesticLeg {
                symbol: symbol.to_string(),
            });
        }

        let total: f64 = [upbit, bithumb]
            .iter()
            .flatten()
            .filter_map(|leg| leg.volume_24h)
            .sum();

        Ok(Self {
            symbol,
            upbit,
            bithumb,
            binance,
            exchange_rate,
            total_volume_24h: (total > 0.0).then_some(total),
            metadata: None,
        })
    }

    pub fn with_metadata(mut self, metadata: Option<AssetMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn symbol(&self) -> &AssetId {
        &self.symbol
    }

    pub fn upbit(&self) -> Option<&DomesticLeg> {
        self.upbit.as_ref()
    }

    pub fn bithumb(&self) -> Option<&DomesticLeg> {
        self.bithumb.as_ref()
    }

    pub fn binance(&self) -> f64 {
        self.binance
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    pub fn total_volume_24h(&self) -> Option<f64> {
        self.total_volume_24h
    }

    pub fn metadata(&self) -> Option<&AssetMetadata> {
        self.metadata.as_ref()
    }

    /// Upbit premium when listed there, otherwise Bithumb's.
    pub fn headline_premium(&self) -> f64 {
        self.upbit
            .or(self.bithumb)
            .map(|leg| leg.premium)
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumRecordWire {
    symbol: AssetId,
    upbit: Option<f64>,
    bithumb: Option<f64>,
    binance: f64,
    exchange_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upbit_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bithumb_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upbit_volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bithumb_volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_volume_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    korean_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    english_name: Option<String>,
}

impl From<PremiumRecord> for PremiumRecordWire {
    fn from(record: PremiumRecord) -> Self {
        let (korean_name, english_name) = match record.metadata {
            Some(metadata) => (Some(metadata.korean_name), Some(metadata.english_name)),
            None => (None, None),
        };

        Self {
            symbol: record.symbol,
            upbit: record.upbit.map(|leg| leg.price),
            bithumb: record.bithumb.map(|leg| leg.price),
            binance: record.binance,
            exchange_rate: record.exchange_rate,
            upbit_premium: record.upbit.map(|leg| leg.premium),
            bithumb_premium: record.bithumb.map(|leg| leg.premium),
            upbit_volume_24h: record.upbit.and_then(|leg| leg.volume_24h),
            bithumb_volume_24h: record.bithumb.and_then(|leg| leg.volume_24h),
            total_volume_24h: record.total_volume_24h,
            korean_name,
            english_name,
        }
    }
}

impl TryFrom<PremiumRecordWire> for PremiumRecord {
    type Error = ValidationError;

    // Premiums and the volume total are derived again from the prices so a
    // decoded record is always internally consistent.
    fn try_from(wire: PremiumRecordWire) -> Result<Self, Self::Error> {
        let leg = |price: Option<f64>, volume: Option<f64>| {
            price
                .map(|price| DomesticLeg::priced(price, volume, wire.binance, wire.exchange_rate))
                .transpose()
        };
        let upbit = leg(wire.upbit, wire.upbit_volume_24h)?;
        let bithumb = leg(wire.bithumb, wire.bithumb_volume_24h)?;

        let metadata = match (wire.korean_name, wire.english_name) {
            (None, None) => None,
            (korean, english) => Some(AssetMetadata::new(
                wire.symbol.clone(),
                korean.unwrap_or_default(),
                english.unwrap_or_default(),
            )),
        };

        Ok(Self::new(wire.symbol, wire.binance, wire.exchange_rate, upbit, bithumb)?
            .with_metadata(metadata))
    }
}

/// Single-asset lookup without inclusion filtering. Any price may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPremium {
    pub coin: AssetId,
    pub upbit: Option<f64>,
    pub bithumb: Option<f64>,
    pub binance: Option<f64>,
    pub exchange_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upbit_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bithumb_premium: Option<f64>,
}

impl CoinPremium {
    pub fn new(
        coin: AssetId,
        upbit: Option<f64>,
        bithumb: Option<f64>,
        binance: Option<f64>,
        exchange_rate: f64,
    ) -> Self {
        let against = |domestic: Option<f64>| {
            domestic
                .zip(binance)
                .map(|(domestic, international)| premium(domestic, international, exchange_rate))
        };

        Self {
            upbit_premium: against(upbit),
            bithumb_premium: against(bithumb),
            coin,
            upbit,
            bithumb,
            binance,
            exchange_rate,
        }
    }
}
