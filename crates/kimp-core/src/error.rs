use thiserror::Error;

/// Validation and contract errors exposed by `kimp-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset symbol cannot be empty")]
    EmptySymbol,
    #[error("asset symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("asset symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid exchange '{value}', expected one of upbit, bithumb, binance")]
    InvalidExchange { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("premium record for '{symbol}' needs at least one domestic price")]
    MissingDomesticLeg { symbol: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid configuration value for {key}: '{value}' ({reason})")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl CoreError {
    pub fn config(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
