//! Margin aggregation engine.
//!
//! Consumes a position file text and the margin store, producing the total
//! margin commitment, call/put subtotals, and a per-line audit trail. Results
//! are recomputed on every invocation; nothing here mutates the store.

use crate::domain::error::B3MarginError;
use crate::domain::instrument::{InstrumentRules, OptionSide};
use crate::domain::money::margin_value;
use crate::domain::position::{self, LineOutcome};
use crate::ports::store_port::MarginStorePort;

/// One audit row per processed position line.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLine {
    pub symbol: String,
    pub quantity: i64,
    pub unit_margin: f64,
    pub line_margin: f64,
    /// Set when the unit margin resolved to zero for a symbol the equity
    /// heuristic says should have had one.
    pub margin_missing: bool,
}

/// A malformed position line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub content: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub total: f64,
    pub call_subtotal: f64,
    pub put_subtotal: f64,
    pub lines: Vec<AuditLine>,
    pub skipped: Vec<SkippedLine>,
}

/// Aggregate the margin commitment of a position file against the store.
///
/// Per-line issues (malformed quantity, symbol absent from the store,
/// unparseable margin text) are recovered; only store access failures
/// propagate.
pub fn aggregate(
    positions_text: &str,
    store: &dyn MarginStorePort,
    rules: &InstrumentRules,
) -> Result<AggregationResult, B3MarginError> {
    let mut result = AggregationResult {
        total: 0.0,
        call_subtotal: 0.0,
        put_subtotal: 0.0,
        lines: Vec::new(),
        skipped: Vec::new(),
    };

    for (line_number, outcome) in position::parse_positions(positions_text) {
        let pos = match outcome {
            LineOutcome::Position(pos) => pos,
            LineOutcome::Malformed { content, reason } => {
                result.skipped.push(SkippedLine {
                    line_number,
                    content,
                    reason,
                });
                continue;
            }
            LineOutcome::Ignored => continue,
        };

        // Lookup miss and unparseable margin text both degrade to zero; the
        // warning flag below separates "missing" from "legitimately free".
        let unit_margin = store
            .lookup(&pos.symbol)?
            .map(|text| margin_value(&text))
            .unwrap_or(0.0);
        let line_margin = pos.quantity as f64 * unit_margin;
        result.total += line_margin;

        match rules.classify(&pos.symbol) {
            Some(OptionSide::Call) => result.call_subtotal += line_margin,
            Some(OptionSide::Put) => result.put_subtotal += line_margin,
            None => {}
        }

        result.lines.push(AuditLine {
            margin_missing: unit_margin == 0.0 && !rules.is_equity(&pos.symbol),
            symbol: pos.symbol,
            quantity: pos.quantity,
            unit_margin,
            line_margin,
        });
    }

    Ok(result)
}
