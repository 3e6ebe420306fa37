//! Kalshi Market Monitor CLI
//!
//! Price monitor for Kalshi prediction markets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kalshi_monitor::{filter, library, monitor, Config, KalshiClient, Market};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "kalshi-monitor")]
#[command(about = "Price monitor for Kalshi prediction markets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a single market, appending one CSV row per poll
    Market {
        /// Market ticker, e.g. KXNCAAMBGAME-26JAN22WISPSU-WIS
        ticker: String,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "60")]
        interval: u64,
    },

    /// Monitor every market in a series, appending one JSONL snapshot per poll
    Series {
        /// Series ticker, e.g. KXEUROCUPGAME
        series_ticker: String,

        /// Keep only markets whose ticker contains every TERM (case-insensitive)
        #[arg(short, long = "filter", value_name = "TERM")]
        filter: Vec<String>,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "60")]
        interval: u64,
    },

    /// List all outcomes in a series, sorted by price
    Outcomes {
        /// Series ticker
        series_ticker: String,

        /// Include near-0 and near-100 prices
        #[arg(long)]
        all: bool,
    },

    /// Find markets in a series matching all terms and print their odds
    Matchup {
        /// Series ticker
        series_ticker: String,

        /// Search terms, all of which must appear in the ticker
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Print YES/NO prices for a single market
    Probability {
        /// Market ticker
        ticker: String,
    },

    /// Save the full series listing to a text file
    Library {
        /// Output path
        #[arg(short, long, default_value = "kalshi_series_library.txt")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    // Load configuration and build the signed client; both fail fast on
    // missing or malformed credentials, before any network call.
    let config = Config::from_env()?;
    let client = KalshiClient::new(&config)?;

    match cli.command {
        Commands::Market { ticker, interval } => {
            monitor::monitor_market(
                &client,
                &config,
                &ticker,
                Duration::from_secs(interval),
                shutdown_channel(),
            )
            .await?
        }
        Commands::Series {
            series_ticker,
            filter,
            interval,
        } => {
            monitor::monitor_series(
                &client,
                &config,
                &series_ticker,
                &filter,
                Duration::from_secs(interval),
                shutdown_channel(),
            )
            .await?
        }
        Commands::Outcomes { series_ticker, all } => {
            list_outcomes(&client, &series_ticker, all).await?
        }
        Commands::Matchup {
            series_ticker,
            terms,
        } => find_matchup(&client, &series_ticker, &terms).await?,
        Commands::Probability { ticker } => show_probability(&client, &ticker).await?,
        Commands::Library { output } => library::save_series_library(&client, &output).await?,
    }

    Ok(())
}

/// Shutdown signal fed by Ctrl-C. The poll loops check it before each
/// fetch and while sleeping.
fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });
    rx
}

/// Fetch all markets in a series and print them sorted by descending price.
async fn list_outcomes(client: &KalshiClient, series_ticker: &str, all: bool) -> Result<()> {
    println!("\n>>> Fetching all outcomes for series: {}...", series_ticker);

    let mut markets = client.fetch_series_markets(series_ticker).await?;
    filter::sort_by_ask_desc(&mut markets);

    println!("Found {} total outcomes.", markets.len());
    if all {
        println!("Showing all prices...\n");
    } else {
        println!("Filtering out prices <= 1¢ and >= 99¢...\n");
    }

    for m in &markets {
        if !all && filter::is_extreme(m) {
            continue;
        }
        let subtitle = m.subtitle.as_deref().unwrap_or("");
        println!(
            "{}¢  - [{}] {} {} (Vol: {})",
            m.ask(),
            m.ticker,
            m.title,
            subtitle,
            m.vol()
        );
    }

    Ok(())
}

/// Find markets whose ticker contains all terms and print their odds.
async fn find_matchup(client: &KalshiClient, series_ticker: &str, terms: &[String]) -> Result<()> {
    println!(
        "\n>>> Searching {} for: {}...",
        series_ticker,
        terms.join(" + ")
    );

    let markets = client.fetch_series_markets(series_ticker).await?;
    let matches: Vec<&Market> = markets
        .iter()
        .filter(|m| filter::matches_all_terms(&m.ticker, terms))
        .collect();

    if matches.is_empty() {
        println!("No markets found matching all terms.");
        return Ok(());
    }

    println!("Found {} related markets. Fetching odds...\n", matches.len());
    for m in matches {
        println!("--- {} ---", m.title);
        println!("Ticker:       {}", m.ticker);
        println!("Market Price: {} cents", m.ask());
        println!("Total Volume: {}\n", m.vol());
    }

    Ok(())
}

/// Print the BUY YES and BUY NO prices for one market.
async fn show_probability(client: &KalshiClient, ticker: &str) -> Result<()> {
    let market = client.get_market(ticker).await?;

    println!("\n>>> Probabilities for: {}", market.title);
    println!("Ticker:  {}", ticker);
    println!("YES:     {}% ({}¢)", market.ask(), market.ask());
    println!("NO:      {}% ({}¢)", market.no_price(), market.no_price());

    Ok(())
}
