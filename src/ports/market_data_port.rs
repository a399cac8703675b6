//! Market data access port trait.

use crate::domain::delta::OptionQuote;
use crate::domain::error::B3MarginError;

/// Per-symbol option pricing data (delta, price, strike, volatility).
pub trait MarketDataPort {
    fn option_quote(&self, symbol: &str) -> Result<OptionQuote, B3MarginError>;
}
