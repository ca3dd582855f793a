//! Exchange source traits and per-source result types.
//!
//! Every exchange client implements [`MarketSource`]; the reference-rate
//! client implements [`RateSource`]. Fetches never fail the pipeline as a
//! whole: a source reports a [`FetchOutcome`] and the aggregator decides what
//! an empty or failed book means.
//!
//! # Contracts
//!
//! | Method | Result | Description |
//! |--------|--------|-------------|
//! | [`prices`](MarketSource::prices) | [`PriceBook`] | Last price and 24h volume per asset |
//! | [`listing`](MarketSource::listing) | [`ListingBook`] | Korean/English display names |
//! | [`rate`](RateSource::rate) | [`ExchangeRate`] | USD to KRW, never absent |

use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{AssetId, ExchangeId, ExchangeRate, HttpError, ListingBook, PriceBook};

/// Which assets a price request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolScope {
    /// Every asset the exchange lists.
    All,
    /// Exactly these assets; missing ones are simply absent from the book.
    Only(BTreeSet<AssetId>),
}

impl SymbolScope {
    pub fn only<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = AssetId>,
    {
        Self::Only(ids.into_iter().collect())
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
        }
    }
}

/// What a market source can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Accepts [`SymbolScope::All`].
    pub wildcard_prices: bool,
}

impl Capabilities {
    pub const fn domestic() -> Self {
        Self {
            wildcard_prices: true,
        }
    }

    pub const fn per_symbol() -> Self {
        Self {
            wildcard_prices: false,
        }
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedScope,
    Unavailable,
    Malformed,
    InvalidRequest,
}

/// Structured error reported by an exchange or rate client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_scope(source: ExchangeId, what: &str) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedScope,
            message: format!("{what} is not supported by {source}"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn from_transport(label: &str, error: &HttpError) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: format!("{label} request failed: {}", error.message()),
            retryable: error.retryable(),
        }
    }

    /// Prefix the message, keeping kind and retry hint.
    pub fn context(mut self, context: &str) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedScope => "source.unsupported_scope",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Result of one source fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    /// The call succeeded but nothing usable came back.
    Empty,
    Failed(SourceError),
    /// Served from a built-in substitute list after `SourceError`; the value
    /// is usable but possibly incomplete.
    Fallback(T, SourceError),
}

impl<T> FetchOutcome<T> {
    pub fn error(&self) -> Option<&SourceError> {
        match self {
            Self::Failed(error) | Self::Fallback(_, error) => Some(error),
            Self::Fetched(_) | Self::Empty => None,
        }
    }

    /// Mark the outcome as produced from a substitute list. An empty result
    /// becomes a failure so the cause is not lost.
    pub fn degraded_by(self, cause: Option<SourceError>) -> Self {
        match (self, cause) {
            (Self::Fetched(value), Some(cause)) => Self::Fallback(value, cause),
            (Self::Empty, Some(cause)) => Self::Failed(cause),
            (outcome, _) => outcome,
        }
    }
}

impl<K, V> FetchOutcome<HashMap<K, V>> {
    /// `Empty` for an empty map, `Fetched` otherwise.
    pub fn from_map(map: HashMap<K, V>) -> Self {
        if map.is_empty() {
            Self::Empty
        } else {
            Self::Fetched(map)
        }
    }

    /// Empty and failed outcomes become an empty map.
    pub fn into_map(self) -> HashMap<K, V> {
        match self {
            Self::Fetched(map) | Self::Fallback(map, _) => map,
            Self::Empty | Self::Failed(_) => HashMap::new(),
        }
    }
}

/// Boxed future returned by source traits.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exchange client contract.
///
/// Implementations must be `Send + Sync`; the service shares them behind `Arc`
/// and polls several at once.
pub trait MarketSource: Send + Sync {
    fn id(&self) -> ExchangeId;

    fn capabilities(&self) -> Capabilities;

    /// Normalized prices for `scope`.
    ///
    /// A single asset that cannot be fetched or parsed is left out of the book;
    /// only a failure of the whole call is reported as [`FetchOutcome::Failed`].
    fn prices<'a>(&'a self, scope: SymbolScope) -> SourceFuture<'a, FetchOutcome<PriceBook>>;

    /// KRW market listing with display names.
    fn listing<'a>(&'a self) -> SourceFuture<'a, FetchOutcome<ListingBook>>;
}

/// Reference-rate contract. Always yields a usable rate.
pub trait RateSource: Send + Sync {
    fn rate<'a>(&'a self) -> SourceFuture<'a, ExchangeRate>;
}
