mod binance;
mod bithumb;
mod exchange_rate;
mod parse;
mod upbit;

pub use binance::{BinanceClient, FALLBACK_PAIRS};
pub use bithumb::BithumbClient;
pub use exchange_rate::ExchangeRateClient;
pub use upbit::{UpbitClient, FALLBACK_MARKETS};
