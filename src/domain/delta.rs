//! Portfolio delta aggregation.
//!
//! Equities carry a delta of 1 per unit; option symbols are priced through
//! the market-data port. A failed per-symbol lookup skips that line and the
//! run continues.

use crate::domain::error::B3MarginError;
use crate::domain::position::{self, LineOutcome};
use crate::ports::market_data_port::MarketDataPort;

/// Symbols up to this length are equities and never hit the market-data API.
/// B3 option symbols are root + series letter + strike digits, at least seven
/// characters.
pub const EQUITY_MAX_LEN: usize = 6;

/// Black-Scholes data for one option symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionQuote {
    pub delta: f64,
    pub price: f64,
    pub strike: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaLine {
    pub symbol: String,
    pub quantity: i64,
    pub delta: f64,
    pub position_delta: f64,
    /// Present for options; equities have no quote.
    pub quote: Option<OptionQuote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaReport {
    pub total_delta: f64,
    pub lines: Vec<DeltaLine>,
    /// Malformed position lines and failed symbol lookups, with reasons.
    pub skipped: Vec<(usize, String)>,
}

pub fn aggregate_delta(
    positions_text: &str,
    market_data: &dyn MarketDataPort,
) -> DeltaReport {
    let mut report = DeltaReport {
        total_delta: 0.0,
        lines: Vec::new(),
        skipped: Vec::new(),
    };

    for (line_number, outcome) in position::parse_positions(positions_text) {
        let pos = match outcome {
            LineOutcome::Position(pos) => pos,
            LineOutcome::Malformed { content, reason } => {
                report
                    .skipped
                    .push((line_number, format!("{content}: {reason}")));
                continue;
            }
            LineOutcome::Ignored => continue,
        };

        let (delta, quote) = if pos.symbol.chars().count() <= EQUITY_MAX_LEN {
            (1.0, None)
        } else {
            match market_data.option_quote(&pos.symbol) {
                Ok(quote) => (quote.delta, Some(quote)),
                Err(e) => {
                    report.skipped.push((line_number, e.to_string()));
                    continue;
                }
            }
        };

        let position_delta = pos.quantity as f64 * delta;
        report.total_delta += position_delta;
        report.lines.push(DeltaLine {
            symbol: pos.symbol,
            quantity: pos.quantity,
            delta,
            position_delta,
            quote,
        });
    }

    report
}
