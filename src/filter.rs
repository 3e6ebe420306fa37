//! Market filtering and selection
//!
//! Two independent filters apply at different pipeline stages: the settled
//! filter shapes the persisted snapshot, the negligible filter only trims
//! console display lists.

use crate::types::Market;

/// Maximum valid quote in cents. A bid or ask at this level is treated as
/// a settled market.
///
/// Assumption: "price at the maximum means settled" is a domain heuristic,
/// not a documented API guarantee.
pub const MAX_PRICE_CENTS: i64 = 100;

/// Quotes at or below this are hidden from console display lists.
pub const NEGLIGIBLE_PRICE_CENTS: i64 = 1;

/// True when the ticker (case-folded) contains every search term.
pub fn matches_all_terms(ticker: &str, terms: &[String]) -> bool {
    let ticker = ticker.to_uppercase();
    terms.iter().all(|term| ticker.contains(&term.to_uppercase()))
}

/// True when either tracked price has reached the maximum valid quote.
pub fn is_settled(market: &Market) -> bool {
    market.ask() >= MAX_PRICE_CENTS || market.bid() >= MAX_PRICE_CENTS
}

/// True when the ask is too small to be worth displaying.
pub fn is_negligible(market: &Market) -> bool {
    market.ask() <= NEGLIGIBLE_PRICE_CENTS
}

/// True when the ask sits at either extreme of the valid range. Used by
/// the outcomes listing to hide all-but-decided markets.
pub fn is_extreme(market: &Market) -> bool {
    market.ask() <= NEGLIGIBLE_PRICE_CENTS || market.ask() >= MAX_PRICE_CENTS - 1
}

/// Sorts markets in place by descending yes-ask.
pub fn sort_by_ask_desc(markets: &mut [Market]) {
    markets.sort_by(|a, b| b.ask().cmp(&a.ask()));
}

/// The `n` highest-priced markets, descending by yes-ask.
pub fn top_by_ask<'a>(markets: &[&'a Market], n: usize) -> Vec<&'a Market> {
    let mut sorted = markets.to_vec();
    sorted.sort_by(|a, b| b.ask().cmp(&a.ask()));
    sorted.truncate(n);
    sorted
}
