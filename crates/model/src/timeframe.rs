//! Candle aggregation timeframes and their canonical evaluation order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A candle timeframe the validator can be configured for.
///
/// Validation always walks timeframes from the widest down, so the canonical
/// order is 4h → 1h → 15m → 5m → 1m.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    H4,
    H1,
    M15,
    M5,
    M1,
}

impl Timeframe {
    /// Canonical evaluation order, widest first.
    pub const ORDERED: [Timeframe; 5] = [
        Timeframe::H4,
        Timeframe::H1,
        Timeframe::M15,
        Timeframe::M5,
        Timeframe::M1,
    ];

    /// String form used in configuration and indicator keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H4 => "4h",
            Self::H1 => "1h",
            Self::M15 => "15m",
            Self::M5 => "5m",
            Self::M1 => "1m",
        }
    }

    /// The canonical order sliced from `start` onward (inclusive).
    pub fn from_start(start: Timeframe) -> &'static [Timeframe] {
        let pos = Self::ORDERED
            .iter()
            .position(|tf| *tf == start)
            .unwrap_or(0);
        &Self::ORDERED[pos..]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "4h" => Ok(Self::H4),
            "1h" => Ok(Self::H1),
            "15m" => Ok(Self::M15),
            "5m" => Ok(Self::M5),
            "1m" => Ok(Self::M1),
            _ => Err(ParseTimeframeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ParseTimeframeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.as_str().to_string()
    }
}

/// Error parsing a timeframe string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid timeframe '{0}', expected one of 4h/1h/15m/5m/1m")]
pub struct ParseTimeframeError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        assert_eq!(
            Timeframe::ORDERED,
            [
                Timeframe::H4,
                Timeframe::H1,
                Timeframe::M15,
                Timeframe::M5,
                Timeframe::M1
            ]
        );
    }

    #[test]
    fn test_from_start_slices() {
        assert_eq!(Timeframe::from_start(Timeframe::H4).len(), 5);
        assert_eq!(
            Timeframe::from_start(Timeframe::M15),
            &[Timeframe::M15, Timeframe::M5, Timeframe::M1]
        );
        assert_eq!(Timeframe::from_start(Timeframe::M1), &[Timeframe::M1]);
    }

    #[test]
    fn test_parse_roundtrip() {
        for tf in Timeframe::ORDERED {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("4H".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!("15M".parse::<Timeframe>().unwrap(), Timeframe::M15);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("2h".parse::<Timeframe>().is_err());
        assert!("".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Timeframe::H1.to_string(), "1h");
        assert_eq!(Timeframe::M5.to_string(), "5m");
    }
}
