//! Append-only monitor logs
//!
//! Each write opens the file, appends, flushes, and drops the handle; no
//! handle is held across poll cycles. Records are never mutated, merged,
//! or deduplicated after being written.

use crate::types::{PriceRow, SeriesInfo, Snapshot};
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// CSV log for single-market monitoring. The header row is written once,
/// when the file is new.
pub struct CsvPriceLog {
    path: PathBuf,
}

impl CsvPriceLog {
    /// Creates the log directory if needed and resolves the log path for
    /// the given ticker.
    pub fn create(dir: &Path, ticker: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {:?}", dir))?;
        Ok(Self {
            path: dir.join(format!("{}_log.csv", ticker)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first if the file is empty.
    pub fn append(&self, row: &PriceRow) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open CSV log {:?}", self.path))?;

        let needs_headers = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_headers)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

/// JSONL log for series monitoring: one self-contained snapshot per line.
pub struct JsonlSnapshotLog {
    path: PathBuf,
}

impl JsonlSnapshotLog {
    /// Creates the log directory if needed. Filter terms become part of
    /// the file name so differently-filtered runs land in separate logs.
    pub fn create(dir: &Path, series_ticker: &str, terms: &[String]) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {:?}", dir))?;

        let suffix = if terms.is_empty() {
            String::new()
        } else {
            format!("_{}", terms.join("_"))
        };
        Ok(Self {
            path: dir.join(format!("{}{}_monitor.jsonl", series_ticker, suffix)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one snapshot as a single JSON line.
    pub fn append(&self, snapshot: &Snapshot) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open JSONL log {:?}", self.path))?;

        let line = serde_json::to_string(snapshot).context("failed to serialize snapshot")?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Writes the series library as a plain-text file, overwriting any
/// previous copy.
pub fn write_series_library(path: &Path, series: &[SeriesInfo]) -> Result<()> {
    let mut out = String::new();
    out.push_str("# KALSHI SERIES LIBRARY\n");
    out.push_str(&format!(
        "# Last Updated: {}\n",
        Local::now().format("%Y-%m-%d")
    ));
    out.push_str(&format!("# Total Series: {}\n\n", series.len()));
    for s in series {
        out.push_str(&format!("[{}] - {}\n", s.ticker, s.title));
    }

    fs::write(path, out).with_context(|| format!("failed to write series library {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Market, Snapshot};

    #[test]
    fn csv_header_written_exactly_once() {
        let temp_dir = std::env::temp_dir().join("test_csv_price_log");
        let _ = fs::remove_dir_all(&temp_dir);

        let log = CsvPriceLog::create(&temp_dir, "KXTEST-26JAN-ABC").unwrap();
        let row = PriceRow {
            timestamp: "2026-01-22 10:00:00".to_string(),
            price_cents: 53,
            volume: 120,
            change: 3,
        };
        log.append(&row).unwrap();
        log.append(&row).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,"));
        assert_eq!(lines[1], lines[2]);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn jsonl_appends_two_distinct_parseable_records() {
        let temp_dir = std::env::temp_dir().join("test_jsonl_snapshot_log");
        let _ = fs::remove_dir_all(&temp_dir);

        let market = Market {
            ticker: "KXTEST-26JAN-ABC".to_string(),
            title: "Test market".to_string(),
            subtitle: None,
            yes_bid: Some(48),
            yes_ask: Some(53),
            no_ask: None,
            volume: Some(120),
        };
        let snapshot = Snapshot::capture("2026-01-22 10:00:00".to_string(), [&market]);

        let log = JsonlSnapshotLog::create(&temp_dir, "KXTEST", &[]).unwrap();
        log.append(&snapshot).unwrap();
        log.append(&snapshot).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let parsed: Vec<Snapshot> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], snapshot);
        assert_eq!(parsed[1], snapshot);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn filter_terms_become_log_name_suffix() {
        let temp_dir = std::env::temp_dir().join("test_jsonl_log_name");
        let _ = fs::remove_dir_all(&temp_dir);

        let plain = JsonlSnapshotLog::create(&temp_dir, "KXEUROCUPGAME", &[]).unwrap();
        assert!(plain.path().ends_with("KXEUROCUPGAME_monitor.jsonl"));

        let filtered =
            JsonlSnapshotLog::create(&temp_dir, "KXEUROCUPGAME", &["NEPMAN".to_string()]).unwrap();
        assert!(filtered.path().ends_with("KXEUROCUPGAME_NEPMAN_monitor.jsonl"));

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn series_library_lists_every_entry() {
        let temp_dir = std::env::temp_dir().join("test_series_library");
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).unwrap();

        let series = vec![
            SeriesInfo {
                ticker: "KXEUROCUPGAME".to_string(),
                title: "Euro Cup games".to_string(),
            },
            SeriesInfo {
                ticker: "KXTRUMPMEET".to_string(),
                title: "Presidential meetings".to_string(),
            },
        ];
        let path = temp_dir.join("library.txt");
        write_series_library(&path, &series).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Total Series: 2"));
        assert!(content.contains("[KXEUROCUPGAME] - Euro Cup games"));
        assert!(content.contains("[KXTRUMPMEET] - Presidential meetings"));

        let _ = fs::remove_dir_all(&temp_dir);
    }
}
