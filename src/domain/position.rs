//! Position file parsing.
//!
//! One position per line, `;`-delimited `quantity;symbol` fields, with an
//! optional trailing `#` comment. Malformed lines never abort a run: they are
//! surfaced to the caller and skipped.

/// One parsed position: a signed quantity (negative for shorts) and an
/// uppercase instrument symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionLine {
    pub quantity: i64,
    pub symbol: String,
}

/// Outcome of parsing one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Position(PositionLine),
    /// Blank after comment stripping, or fewer than two fields. Skipped
    /// silently.
    Ignored,
    /// Structurally a position line but with an unparseable quantity.
    /// Reported as a warning and skipped.
    Malformed { content: String, reason: String },
}

pub fn parse_line(raw: &str) -> LineOutcome {
    let cleaned = raw.split('#').next().unwrap_or("").trim();
    if cleaned.is_empty() {
        return LineOutcome::Ignored;
    }

    let fields: Vec<&str> = cleaned.split(';').collect();
    if fields.len() < 2 {
        return LineOutcome::Ignored;
    }

    let quantity: i64 = match fields[0].trim().parse() {
        Ok(q) => q,
        Err(e) => {
            return LineOutcome::Malformed {
                content: cleaned.to_string(),
                reason: format!("invalid quantity '{}': {}", fields[0].trim(), e),
            };
        }
    };

    LineOutcome::Position(PositionLine {
        quantity,
        symbol: fields[1].trim().to_uppercase(),
    })
}

/// Parse a whole position file text into (1-based line number, outcome)
/// pairs, dropping silently-ignored lines.
pub fn parse_positions(text: &str) -> Vec<(usize, LineOutcome)> {
    text.lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, parse_line(raw)))
        .filter(|(_, outcome)| *outcome != LineOutcome::Ignored)
        .collect()
}
