//! HTTP retrieval of the margin-table document.

use crate::domain::error::B3MarginError;
use crate::ports::document_port::DocumentPort;
use std::time::Duration;

pub const DEFAULT_DOCUMENT_URL: &str = "https://investimentos.btgpactual.com/opcoes/margens";

pub struct HttpDocumentAdapter {
    client: reqwest::blocking::Client,
}

impl HttpDocumentAdapter {
    pub fn new() -> Result<Self, B3MarginError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| B3MarginError::DocumentFetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl DocumentPort for HttpDocumentAdapter {
    fn fetch_text(&self, url: &str) -> Result<String, B3MarginError> {
        let fetch_err = |reason: String| B3MarginError::DocumentFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP status {}", response.status())));
        }

        response.text().map_err(|e| fetch_err(e.to_string()))
    }
}
