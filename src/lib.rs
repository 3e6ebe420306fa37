//! Kalshi Market Monitor Library
//!
//! Polls the Kalshi trade API on a fixed interval and appends snapshots to
//! local log files:
//!
//! 1. **Single-market monitor**: one CSV row per cycle with price, volume,
//!    and the change since the previous observation.
//! 2. **Series monitor**: one JSONL snapshot per cycle mapping every open
//!    ticker in a series to its current quote, with a top-5 console summary.
//!
//! One-shot commands cover outcome listings, matchup search, and the
//! series library export.

pub mod client;
pub mod config;
pub mod filter;
pub mod library;
pub mod logs;
pub mod monitor;
pub mod pagination;
pub mod types;

pub use client::{ClientError, KalshiClient};
pub use config::Config;
pub use logs::{CsvPriceLog, JsonlSnapshotLog};
pub use monitor::PriceTracker;
pub use types::{Market, MarketsPage, PriceRow, SeriesInfo, Snapshot, SnapshotEntry};
