//! Instrument classification rules.
//!
//! B3 option symbols carry the underlying's four-character root followed by a
//! series letter: A-L encode calls (one letter per expiry month), M-X encode
//! puts. Plain equity symbols have no digits past the root. Both rules are
//! naming-convention heuristics, so they are configuration-backed values
//! rather than constants.

use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSide {
    Call,
    Put,
}

#[derive(Debug, Clone)]
pub struct InstrumentRules {
    /// Length of the underlying root prefix; the series letter sits at this
    /// index.
    pub root_len: usize,
    pub call_range: (char, char),
    pub put_range: (char, char),
}

impl Default for InstrumentRules {
    fn default() -> Self {
        Self {
            root_len: 4,
            call_range: ('A', 'L'),
            put_range: ('M', 'X'),
        }
    }
}

impl InstrumentRules {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        Self {
            root_len: config.get_int("instrument", "root_len", defaults.root_len as i64) as usize,
            call_range: letter_range(config.get_string("instrument", "call_letters"))
                .unwrap_or(defaults.call_range),
            put_range: letter_range(config.get_string("instrument", "put_letters"))
                .unwrap_or(defaults.put_range),
        }
    }

    /// Call/put classification from the series letter. Symbols no longer than
    /// the root, or whose series character falls outside both ranges (digits
    /// included), are not options.
    pub fn classify(&self, symbol: &str) -> Option<OptionSide> {
        let series = symbol.chars().nth(self.root_len)?.to_ascii_uppercase();
        if series >= self.call_range.0 && series <= self.call_range.1 {
            Some(OptionSide::Call)
        } else if series >= self.put_range.0 && series <= self.put_range.1 {
            Some(OptionSide::Put)
        } else {
            None
        }
    }

    /// Equity heuristic: no digit anywhere past the root prefix. Symbols at
    /// or under the root length are equities by definition.
    pub fn is_equity(&self, symbol: &str) -> bool {
        !symbol
            .chars()
            .skip(self.root_len)
            .any(|c| c.is_ascii_digit())
    }
}

/// Parse an `"A-L"` style inclusive letter range.
fn letter_range(value: Option<String>) -> Option<(char, char)> {
    let value = value?;
    let (start, end) = value.trim().split_once('-')?;
    let start = start.trim().chars().next()?.to_ascii_uppercase();
    let end = end.trim().chars().next()?.to_ascii_uppercase();
    (start <= end).then_some((start, end))
}
