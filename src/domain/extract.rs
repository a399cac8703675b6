//! Margin-table record extraction.
//!
//! The broker's margin table arrives as text lines that may pack several
//! (symbol, value) pairs per physical line with no reliable delimiter. A
//! greedy left-to-right cursor scan over the whitespace tokens recognizes two
//! fixed layouts, checked in priority order:
//!
//! - Pattern A: `SYMBOL R$ VALUE` (currency-marked value)
//! - Pattern B: `SYMBOL VALUE` (bare numeric value)
//!
//! False positives are accepted heuristic noise; extraction never fails on a
//! malformed line, it just emits nothing for it.

/// One (symbol, raw margin text) occurrence found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginRecord {
    pub symbol: String,
    pub margin_text: String,
}

/// Column-header words that mark a non-data line, matched case-insensitively
/// anywhere in the line.
const HEADER_MARKERS: [&str; 2] = ["ativo", "margem"];

pub struct Extractor {
    currency_marker: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new("R$")
    }
}

impl Extractor {
    pub fn new(currency_marker: &str) -> Self {
        Self {
            currency_marker: currency_marker.to_string(),
        }
    }

    /// Extract every record from a multi-line document text, in document
    /// order.
    pub fn extract(&self, text: &str) -> Vec<MarginRecord> {
        text.lines()
            .flat_map(|line| self.scan_line(line))
            .collect()
    }

    /// Lazily scan a single line. Header lines and lines with fewer than two
    /// tokens yield nothing.
    pub fn scan_line<'a>(&'a self, line: &'a str) -> LineScan<'a> {
        let lowered = line.to_lowercase();
        let tokens: Vec<&str> = if HEADER_MARKERS.iter().any(|m| lowered.contains(m)) {
            Vec::new()
        } else {
            line.split_whitespace().collect()
        };
        let tokens = if tokens.len() < 2 { Vec::new() } else { tokens };

        LineScan {
            tokens,
            marker: &self.currency_marker,
            cursor: 0,
        }
    }
}

/// Cursor scan over one line's tokens, yielding records as they are found.
pub struct LineScan<'a> {
    tokens: Vec<&'a str>,
    marker: &'a str,
    cursor: usize,
}

impl Iterator for LineScan<'_> {
    type Item = MarginRecord;

    fn next(&mut self) -> Option<MarginRecord> {
        while self.cursor < self.tokens.len() {
            let i = self.cursor;
            if !is_candidate_symbol(self.tokens[i]) {
                self.cursor += 1;
                continue;
            }

            // Currency-marked value takes priority over a bare numeric one so
            // the marker token is never mistaken for the value.
            if i + 2 < self.tokens.len() && self.tokens[i + 1] == self.marker {
                self.cursor = i + 3;
                return Some(MarginRecord {
                    symbol: self.tokens[i].to_string(),
                    margin_text: self.tokens[i + 2].to_string(),
                });
            }

            if i + 1 < self.tokens.len() && contains_digit(self.tokens[i + 1]) {
                self.cursor = i + 2;
                return Some(MarginRecord {
                    symbol: self.tokens[i].to_string(),
                    margin_text: self.tokens[i + 1].to_string(),
                });
            }

            // Candidate with no recognizable value after it: a stray word.
            self.cursor += 1;
        }
        None
    }
}

/// A token is a candidate symbol iff, ignoring embedded periods, it is not
/// purely numeric and it is at least four characters long.
fn is_candidate_symbol(token: &str) -> bool {
    let stripped: String = token.chars().filter(|c| *c != '.').collect();
    let purely_numeric = !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit());
    !purely_numeric && token.chars().count() >= 4
}

fn contains_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn records(line: &str) -> Vec<MarginRecord> {
        Extractor::default().scan_line(line).collect()
    }

    fn record(symbol: &str, margin_text: &str) -> MarginRecord {
        MarginRecord {
            symbol: symbol.into(),
            margin_text: margin_text.into(),
        }
    }

    #[test]
    fn both_patterns_on_one_line() {
        assert_eq!(
            records("PETR4 R$ 1.234,56 VALE3 45,00"),
            vec![record("PETR4", "1.234,56"), record("VALE3", "45,00")]
        );
    }

    #[test]
    fn currency_marked_pattern() {
        assert_eq!(
            records("PETRB120 R$ 1.500,00"),
            vec![record("PETRB120", "1.500,00")]
        );
    }

    #[test]
    fn bare_numeric_pattern() {
        assert_eq!(records("VALE3 45,00"), vec![record("VALE3", "45,00")]);
    }

    #[test]
    fn header_lines_yield_nothing() {
        assert!(records("Ativo Margem").is_empty());
        assert!(records("ATIVO R$ 1.234,56").is_empty());
        assert!(records("tabela de margem teorica maxima").is_empty());
    }

    #[test]
    fn short_lines_yield_nothing() {
        assert!(records("").is_empty());
        assert!(records("   ").is_empty());
        assert!(records("PETR4").is_empty());
    }

    #[test]
    fn short_or_numeric_tokens_are_not_symbols() {
        // "abc" is too short, "12.345" is numeric after stripping periods.
        assert!(records("abc 12.345").is_empty());
        assert!(records("1234 5678").is_empty());
    }

    #[test]
    fn candidates_without_values_yield_nothing() {
        // Both words are candidates by shape, but neither is followed by a
        // token carrying a digit.
        assert!(records("saldo disponivel").is_empty());
    }

    #[test]
    fn marker_at_end_of_line_yields_nothing() {
        // Pattern A needs a value token after the marker; pattern B rejects
        // the marker itself (no digit).
        assert!(records("PETR4 R$").is_empty());
    }

    #[test]
    fn multiline_document() {
        let text = "Ativo Margem\nPETR4 R$ 0,10\n\nVALE3 45,00 ITUB4 R$ 2,50\n";
        assert_eq!(
            Extractor::default().extract(text),
            vec![
                record("PETR4", "0,10"),
                record("VALE3", "45,00"),
                record("ITUB4", "2,50"),
            ]
        );
    }

    #[test]
    fn comma_decimal_token_can_be_taken_as_symbol() {
        // Known heuristic noise: "45,00" is not purely numeric after
        // stripping periods, so it can be picked up as a symbol when another
        // numeric token follows it. Downstream consumers tolerate such
        // garbage records.
        assert_eq!(records("x 45,00 67,89"), vec![record("45,00", "67,89")]);
    }

    #[test]
    fn custom_currency_marker() {
        let extractor = Extractor::new("US$");
        let found: Vec<_> = extractor.scan_line("AAPL US$ 12.50 extra").collect();
        assert_eq!(found, vec![record("AAPL", "12.50")]);
    }

    proptest! {
        #[test]
        fn scan_never_panics(line in ".*") {
            let _ = records(&line);
        }

        #[test]
        fn scan_is_restartable(line in ".*") {
            let first: Vec<_> = records(&line);
            let second: Vec<_> = records(&line);
            prop_assert_eq!(first, second);
        }
    }
}
