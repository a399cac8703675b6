#![allow(dead_code)]

use b3margin::domain::delta::OptionQuote;
use b3margin::domain::error::B3MarginError;
pub use b3margin::domain::extract::MarginRecord;
use b3margin::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::io::Write;

pub fn record(symbol: &str, margin_text: &str) -> MarginRecord {
    MarginRecord {
        symbol: symbol.to_string(),
        margin_text: margin_text.to_string(),
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub struct MockMarketData {
    pub quotes: HashMap<String, OptionQuote>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_delta(mut self, symbol: &str, delta: f64) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            OptionQuote {
                delta,
                price: 1.0,
                strike: 30.0,
                volatility: 40.0,
            },
        );
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn option_quote(&self, symbol: &str) -> Result<OptionQuote, B3MarginError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(B3MarginError::MarketData {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| B3MarginError::MarketData {
                symbol: symbol.to_string(),
                reason: "symbol not found".to_string(),
            })
    }
}
