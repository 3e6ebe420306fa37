//! Poll loops for single-market and series monitoring
//!
//! Both loops run the same cycle: fetch, transform, append to the log,
//! sleep, until the shutdown signal fires. A failed fetch logs the error
//! and skips the cycle; there is no retry and no backoff.

use crate::client::KalshiClient;
use crate::config::Config;
use crate::filter;
use crate::logs::{CsvPriceLog, JsonlSnapshotLog};
use crate::types::{Market, PriceRow, Snapshot};
use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info};

/// Timestamp format used in console output and persisted records.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of markets shown in the series console summary.
const SUMMARY_TOP_N: usize = 5;

/// Tracks the last observed price across poll cycles.
///
/// The only state retained between cycles. The first observation yields no
/// change.
#[derive(Debug, Default)]
pub struct PriceTracker {
    last: Option<i64>,
}

impl PriceTracker {
    /// Records an observation and returns the change since the previous
    /// one, or `None` on the first.
    pub fn observe(&mut self, price: i64) -> Option<i64> {
        let change = self.last.map(|prev| price - prev);
        self.last = Some(price);
        change
    }
}

/// Monitors a single market: one console line and one CSV row per cycle.
pub async fn monitor_market(
    client: &KalshiClient,
    config: &Config,
    ticker: &str,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let log = CsvPriceLog::create(&config.log_dir, ticker)?;
    info!("Starting monitor for {}", ticker);
    info!("Update interval: {}s", interval.as_secs());
    info!("Logging to {}", log.path().display());

    let mut tracker = PriceTracker::default();

    loop {
        if *shutdown.borrow() {
            break;
        }

        match client.get_market(ticker).await {
            Ok(market) => {
                let price = market.ask();
                let volume = market.vol();
                let change = tracker.observe(price);
                let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

                println!(
                    "[{}] {} [{}] | Price: {}¢ {} | Vol: {}",
                    timestamp,
                    market.title,
                    ticker_suffix(ticker),
                    price,
                    format_change(change),
                    volume
                );

                log.append(&PriceRow {
                    timestamp,
                    price_cents: price,
                    volume,
                    change: change.unwrap_or(0),
                })?;
            }
            Err(e) => error!("Fetch failed for {}: {}", ticker, e),
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sleep(interval) => {}
        }
    }

    info!("Monitor stopped");
    Ok(())
}

/// Monitors a series: one JSONL snapshot and one console summary per cycle.
///
/// The persisted snapshot holds every non-settled market that passed the
/// term filter; the negligible-price filter and top-N cut only shape the
/// console summary.
pub async fn monitor_series(
    client: &KalshiClient,
    config: &Config,
    series_ticker: &str,
    terms: &[String],
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let log = JsonlSnapshotLog::create(&config.log_dir, series_ticker, terms)?;
    if terms.is_empty() {
        info!("Initializing JSONL monitor for series {}", series_ticker);
    } else {
        info!(
            "Initializing JSONL monitor for series {} (filtered by: {})",
            series_ticker,
            terms.join(", ")
        );
    }
    info!("Update interval: {}s", interval.as_secs());
    info!("Logging to {}", log.path().display());

    loop {
        if *shutdown.borrow() {
            break;
        }

        match client.fetch_series_markets(series_ticker).await {
            Ok(mut markets) => {
                if !terms.is_empty() {
                    markets.retain(|m| filter::matches_all_terms(&m.ticker, terms));
                }

                let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
                let open: Vec<&Market> =
                    markets.iter().filter(|m| !filter::is_settled(m)).collect();

                let snapshot = Snapshot::capture(timestamp.clone(), open.iter().copied());
                log.append(&snapshot)?;

                let display: Vec<&Market> = open
                    .iter()
                    .copied()
                    .filter(|m| !filter::is_negligible(m))
                    .collect();
                println!("[{}] {} ...", timestamp, summary_line(&display));
            }
            Err(e) => error!("Fetch failed for series {}: {}", series_ticker, e),
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sleep(interval) => {}
        }
    }

    info!("Monitor stopped");
    Ok(())
}

/// Top-5 summary: `[SUFFIX] bid/ask¢ (vVOL)` segments joined by ` | `.
pub fn summary_line(display: &[&Market]) -> String {
    let top = filter::top_by_ask(display, SUMMARY_TOP_N);
    if top.is_empty() {
        return "(no open markets)".to_string();
    }
    let parts: Vec<String> = top
        .iter()
        .map(|m| {
            format!(
                "[{}] {}/{}¢ (v{})",
                ticker_suffix(&m.ticker),
                m.bid(),
                m.ask(),
                m.vol()
            )
        })
        .collect();
    parts.join(" | ")
}

/// Trailing segment of a ticker, e.g. `BAR` from `KX...-SLABAR-BAR`.
pub fn ticker_suffix(ticker: &str) -> &str {
    ticker.rsplit('-').next().unwrap_or(ticker)
}

/// Signed change for console display; empty on the first observation.
fn format_change(change: Option<i64>) -> String {
    match change {
        Some(c) if c > 0 => format!("(+{})", c).green().to_string(),
        Some(c) if c < 0 => format!("({})", c).red().to_string(),
        Some(_) => "(+0)".to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(ticker: &str, bid: i64, ask: i64, volume: i64) -> Market {
        Market {
            ticker: ticker.to_string(),
            title: format!("{} title", ticker),
            subtitle: None,
            yes_bid: Some(bid),
            yes_ask: Some(ask),
            no_ask: None,
            volume: Some(volume),
        }
    }

    #[test]
    fn delta_sequence_matches_observed_prices() {
        let mut tracker = PriceTracker::default();
        assert_eq!(tracker.observe(50), None);
        assert_eq!(tracker.observe(53), Some(3));
        assert_eq!(tracker.observe(53), Some(0));
        assert_eq!(tracker.observe(49), Some(-4));
    }

    #[test]
    fn ticker_suffix_is_segment_after_last_dash() {
        assert_eq!(ticker_suffix("KXEUROCUPGAME-26JAN-SLABAR-BAR"), "BAR");
        assert_eq!(ticker_suffix("NODASH"), "NODASH");
    }

    #[test]
    fn summary_orders_by_descending_ask_and_caps_at_five() {
        let markets = vec![
            market("S-A", 5, 10, 1),
            market("S-B", 90, 99, 2),
            market("S-C", 45, 50, 3),
            market("S-D", 0, 1, 4),
            market("S-E", 20, 25, 5),
            market("S-F", 30, 35, 6),
        ];
        let refs: Vec<&Market> = markets.iter().collect();
        let line = summary_line(&refs);

        let b = line.find("[B]").unwrap();
        let c = line.find("[C]").unwrap();
        let f = line.find("[F]").unwrap();
        assert!(b < c && c < f);
        // Six candidates, summary keeps five; the cheapest is cut.
        assert!(!line.contains("[D]"));
        assert!(line.contains("[B] 90/99¢ (v2)"));
    }

    #[test]
    fn settled_markets_excluded_from_snapshot() {
        let markets = vec![market("S-SET", 0, 100, 9), market("S-OPEN", 48, 53, 7)];
        let open: Vec<&Market> = markets.iter().filter(|m| !filter::is_settled(m)).collect();
        let snapshot = Snapshot::capture("t".to_string(), open.iter().copied());

        assert!(!snapshot.markets.contains_key("S-SET"));
        assert!(snapshot.markets.contains_key("S-OPEN"));
    }

    #[test]
    fn empty_display_list_has_placeholder() {
        assert_eq!(summary_line(&[]), "(no open markets)");
    }

    #[test]
    fn first_observation_prints_no_change() {
        assert_eq!(format_change(None), "");
        assert_eq!(format_change(Some(0)), "(+0)");
    }
}
