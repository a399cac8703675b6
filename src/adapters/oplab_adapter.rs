//! OpLab market-data adapter.
//!
//! Queries the Black-Scholes endpoint for per-option delta, price, strike,
//! and volatility. The access token is injected through configuration, never
//! read from the process environment.

use crate::domain::delta::OptionQuote;
use crate::domain::error::B3MarginError;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.oplab.com.br/v3/market";
pub const DEFAULT_IRATE: f64 = 15.0;

#[derive(Debug)]
pub struct OplabAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
    irate: f64,
}

impl OplabAdapter {
    pub fn new(base_url: &str, access_token: &str, irate: f64) -> Result<Self, B3MarginError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| B3MarginError::MarketData {
                symbol: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            irate,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, B3MarginError> {
        let access_token = config.get_string("oplab", "access_token").ok_or_else(|| {
            B3MarginError::ConfigMissing {
                section: "oplab".into(),
                key: "access_token".into(),
            }
        })?;
        let base_url = config.get_string_or("oplab", "base_url", DEFAULT_BASE_URL);
        let irate = config.get_double("oplab", "irate", DEFAULT_IRATE);
        Self::new(&base_url, &access_token, irate)
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!(
            "{}/options/bs?symbol={}&irate={}",
            self.base_url, symbol, self.irate
        )
    }
}

impl MarketDataPort for OplabAdapter {
    fn option_quote(&self, symbol: &str) -> Result<OptionQuote, B3MarginError> {
        let market_err = |reason: String| B3MarginError::MarketData {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.quote_url(symbol))
            .header("Access-Token", &self.access_token)
            .send()
            .map_err(|e| market_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(market_err(format!("HTTP status {}", response.status())));
        }

        let body = response.text().map_err(|e| market_err(e.to_string()))?;
        parse_quote(symbol, &body)
    }
}

#[derive(Deserialize)]
struct BsResponse {
    delta: Option<f64>,
    price: Option<f64>,
    strike: Option<f64>,
    volatility: Option<f64>,
}

/// Decode a Black-Scholes response body. All four fields must be present; a
/// partial answer is an error, not a zero-filled quote.
fn parse_quote(symbol: &str, body: &str) -> Result<OptionQuote, B3MarginError> {
    let market_err = |reason: String| B3MarginError::MarketData {
        symbol: symbol.to_string(),
        reason,
    };

    let parsed: BsResponse =
        serde_json::from_str(body).map_err(|e| market_err(format!("bad response body: {e}")))?;

    match (parsed.delta, parsed.price, parsed.strike, parsed.volatility) {
        (Some(delta), Some(price), Some(strike), Some(volatility)) => Ok(OptionQuote {
            delta,
            price,
            strike,
            volatility,
        }),
        _ => Err(market_err(
            "response missing delta, price, strike, or volatility".into(),
        )),
    }
}
