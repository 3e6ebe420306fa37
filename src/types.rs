//! Core types for the Kalshi market monitor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One market listing as returned by the trade API.
///
/// Numeric fields may be absent in API responses. The missing-value policy
/// is default-to-zero, applied once at the accessor boundary (`ask()`,
/// `bid()`, `no_price()`, `vol()`) so callers never branch on `Option`.
/// Prices are quoted in cents, 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub yes_bid: Option<i64>,
    #[serde(default)]
    pub yes_ask: Option<i64>,
    #[serde(default)]
    pub no_ask: Option<i64>,
    #[serde(default)]
    pub volume: Option<i64>,
}

impl Market {
    /// Yes-side ask price with the missing-value default applied.
    pub fn ask(&self) -> i64 {
        self.yes_ask.unwrap_or(0)
    }

    /// Yes-side bid price with the missing-value default applied.
    pub fn bid(&self) -> i64 {
        self.yes_bid.unwrap_or(0)
    }

    /// No-side ask price with the missing-value default applied.
    pub fn no_price(&self) -> i64 {
        self.no_ask.unwrap_or(0)
    }

    pub fn vol(&self) -> i64 {
        self.volume.unwrap_or(0)
    }
}

/// One page of a market listing plus its continuation cursor.
#[derive(Debug, Deserialize)]
pub struct MarketsPage {
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One series entry from the series listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesInfo {
    pub ticker: String,
    #[serde(default)]
    pub title: String,
}

/// One page of the series listing plus its continuation cursor.
#[derive(Debug, Deserialize)]
pub struct SeriesPage {
    #[serde(default)]
    pub series: Vec<SeriesInfo>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Quote fields persisted per ticker in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub title: String,
    pub ask: i64,
    pub bid: i64,
    pub volume: i64,
}

/// One timestamped capture of a series: ticker -> current quote.
///
/// Built fresh each poll cycle and discarded after being appended to the
/// log. Keys are unique; a later duplicate ticker overwrites the earlier
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub markets: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    /// Captures the given markets under one timestamp.
    pub fn capture<'a, I>(timestamp: String, markets: I) -> Self
    where
        I: IntoIterator<Item = &'a Market>,
    {
        let mut map = BTreeMap::new();
        for m in markets {
            map.insert(
                m.ticker.clone(),
                SnapshotEntry {
                    title: m.title.clone(),
                    ask: m.ask(),
                    bid: m.bid(),
                    volume: m.vol(),
                },
            );
        }
        Self {
            timestamp,
            markets: map,
        }
    }
}

/// One row of the single-market CSV log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRow {
    pub timestamp: String,
    pub price_cents: i64,
    pub volume: i64,
    pub change: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(ticker: &str, ask: Option<i64>) -> Market {
        Market {
            ticker: ticker.to_string(),
            title: format!("{} title", ticker),
            subtitle: None,
            yes_bid: Some(1),
            yes_ask: ask,
            no_ask: None,
            volume: Some(10),
        }
    }

    #[test]
    fn missing_numeric_fields_read_as_zero() {
        let m = Market {
            ticker: "T".to_string(),
            title: String::new(),
            subtitle: None,
            yes_bid: None,
            yes_ask: None,
            no_ask: None,
            volume: None,
        };
        assert_eq!(m.ask(), 0);
        assert_eq!(m.bid(), 0);
        assert_eq!(m.no_price(), 0);
        assert_eq!(m.vol(), 0);
    }

    #[test]
    fn snapshot_later_duplicate_overwrites_earlier() {
        let first = market("GAME-A", Some(40));
        let second = market("GAME-A", Some(60));
        let snapshot = Snapshot::capture("t".to_string(), [&first, &second]);

        assert_eq!(snapshot.markets.len(), 1);
        assert_eq!(snapshot.markets["GAME-A"].ask, 60);
    }

    #[test]
    fn deserializes_market_with_absent_fields() {
        let m: Market = serde_json::from_str(r#"{"ticker":"X-Y-Z"}"#).unwrap();
        assert_eq!(m.ticker, "X-Y-Z");
        assert_eq!(m.ask(), 0);
        assert_eq!(m.vol(), 0);
    }
}
