use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::reconcile::STABLE_ASSET;
use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Normalized asset ticker. This is the join key across every exchange.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Parse and normalize a ticker to uppercase.
    ///
    /// Leading digits are allowed since listed tickers such as `1INCH` start with one.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the dollar-pegged asset whose international price is fixed at 1.0.
    pub fn is_stable(&self) -> bool {
        self.0 == STABLE_ASSET
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for AssetId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for AssetId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = AssetId::parse(" btc ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "BTC");
    }

    #[test]
    fn accepts_leading_digit() {
        let parsed = AssetId::parse("1inch").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "1INCH");
    }

    #[test]
    fn rejects_pair_separators() {
        let err = AssetId::parse("KRW-BTC").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { ch: '-', index: 3 }));
    }

    #[test]
    fn rejects_empty_and_overlong_input() {
        assert_eq!(AssetId::parse("   "), Err(ValidationError::EmptySymbol));
        assert!(matches!(
            AssetId::parse("ABCDEFGHIJKLMNOP"),
            Err(ValidationError::SymbolTooLong { len: 16, max: 15 })
        ));
    }

    #[test]
    fn usdt_is_the_stable_asset() {
        assert!(AssetId::parse("usdt").expect("valid").is_stable());
        assert!(!AssetId::parse("USDC").expect("valid").is_stable());
    }
}
