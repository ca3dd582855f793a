//! # kimp Core
//!
//! Kimchi-premium aggregation: Upbit and Bithumb KRW prices joined with
//! Binance USDT prices and a USD/KRW reference rate.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Upbit, Bithumb, Binance and reference-rate clients |
//! | [`aggregate`] | Join of price books into premium records |
//! | [`config`] | Upstream endpoints, timeouts and pacing |
//! | [`data_source`] | Source traits, scopes and fetch outcomes |
//! | [`domain`] | Asset ids, prices, rates and premium records |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction and fixtures |
//! | [`reconcile`] | Identifier union and pair mapping |
//! | [`retry`] | Transport retries with backoff |
//! | [`service`] | [`PremiumService`] pipeline entry point |
//! | [`source`] | Exchange identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kimp_core::{PremiumService, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = PremiumService::live(&UpstreamConfig::from_env()?)?;
//!     let report = service.all_premium_data().await;
//!
//!     for (symbol, record) in &report.records {
//!         println!("{symbol}: {:+.2}%", record.headline_premium());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  PremiumService  │
//! └────────┬─────────┘
//!          │ tokio::join!
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Upbit / Bithumb  │     │ Reference rate   │
//! │ prices, listings │     │ (1390.0 fallback)│
//! └────────┬─────────┘     └────────┬─────────┘
//!          │ reconcile               │
//!          ▼                         │
//! ┌──────────────────┐               │
//! │ Binance (paced,  │               │
//! │ buffer_unordered)│               │
//! └────────┬─────────┘               │
//!          ▼                         ▼
//! ┌──────────────────────────────────────────┐
//! │ join_premiums -> PremiumReport           │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Upstream failures never fail a run. Each source reports a
//! [`FetchOutcome`]; failed outcomes become report warnings and the affected
//! book is treated as empty:
//!
//! ```rust
//! use kimp_core::{FetchOutcome, PriceBook, SourceError, SourceErrorKind};
//!
//! fn describe(outcome: &FetchOutcome<PriceBook>) -> &'static str {
//!     match outcome.error().map(SourceError::kind) {
//!         Some(SourceErrorKind::Unavailable) => "upstream down",
//!         Some(SourceErrorKind::Malformed) => "unexpected payload",
//!         Some(_) => "rejected",
//!         None => "ok",
//!     }
//! }
//! ```

pub mod adapters;
pub mod aggregate;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod reconcile;
pub mod retry;
pub mod service;
pub mod source;

pub use adapters::{BinanceClient, BithumbClient, ExchangeRateClient, UpbitClient};
pub use aggregate::{join_premiums, JoinInputs, PremiumTable};
pub use config::UpstreamConfig;
pub use data_source::{
    Capabilities, FetchOutcome, MarketSource, RateSource, SourceError, SourceErrorKind,
    SourceFuture, SymbolScope,
};
pub use domain::{
    premium, AssetId, AssetMetadata, CoinPremium, DomesticLeg, ExchangeRate, ListingBook,
    PriceBook, PricePoint, PremiumRecord, RateOrigin, UtcDateTime, FALLBACK_KRW_PER_USD,
};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    fetch_json, FixtureHttpClient, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
pub use reconcile::{domestic_market_symbol, reconcile, to_international_pair};
pub use retry::{Backoff, RetryConfig, RetryingHttpClient};
pub use service::{FetchWarning, PremiumReport, PremiumService};
pub use source::ExchangeId;
