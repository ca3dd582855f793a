//! # Domain Models
//!
//! Canonical types shared by every exchange client and the aggregator.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AssetId`] | Validated, uppercase ticker used as the join key |
//! | [`PricePoint`] | Price and optional 24h traded value on one exchange |
//! | [`AssetMetadata`] | Korean/English display names from a market listing |
//! | [`ExchangeRate`] | USD to KRW reference rate with its origin |
//! | [`PremiumRecord`] | Joined per-asset result with premiums and volume |
//! | [`CoinPremium`] | Unfiltered single-asset lookup |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! ## Validation
//!
//! Constructors enforce invariants, so an invalid value never reaches the join:
//!
//! ```rust,ignore
//! use kimp_core::{AssetId, PricePoint, ValidationError};
//!
//! let btc = AssetId::parse("btc")?;
//! assert_eq!(btc.as_str(), "BTC");
//!
//! let invalid = PricePoint::new(btc, 0.0, None);
//! assert!(matches!(invalid, Err(ValidationError::NonPositiveValue { .. })));
//! ```

mod asset;
mod models;
mod premium;
mod timestamp;

pub use asset::AssetId;
pub use models::{
    AssetMetadata, ExchangeRate, ListingBook, PriceBook, PricePoint, RateOrigin,
    FALLBACK_KRW_PER_USD,
};
pub use premium::{premium, CoinPremium, DomesticLeg, PremiumRecord};
pub use timestamp::UtcDateTime;
