//! Series library export
//!
//! Drains the full paginated series listing and writes it, sorted by
//! ticker, to a plain-text library file.

use crate::client::KalshiClient;
use crate::logs;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Fetches every series and writes the sorted library file.
pub async fn save_series_library(client: &KalshiClient, path: &Path) -> Result<()> {
    info!("Fetching series library...");

    let mut series = client.fetch_all_series().await?;
    series.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    logs::write_series_library(path, &series)?;
    info!("Saved {} series to {}", series.len(), path.display());
    Ok(())
}
