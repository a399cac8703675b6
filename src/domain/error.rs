//! Domain error types.

/// Top-level error type for b3margin.
#[derive(Debug, thiserror::Error)]
pub enum B3MarginError {
    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cannot read position file {path}: {reason}")]
    PositionFile { path: String, reason: String },

    #[error("document fetch failed for {url}: {reason}")]
    DocumentFetch { url: String, reason: String },

    #[error("export write failed for {path}: {reason}")]
    ExportWrite { path: String, reason: String },

    #[error("market data error for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&B3MarginError> for std::process::ExitCode {
    fn from(err: &B3MarginError) -> Self {
        let code: u8 = match err {
            B3MarginError::Io(_)
            | B3MarginError::PositionFile { .. }
            | B3MarginError::Store { .. }
            | B3MarginError::StoreQuery { .. }
            | B3MarginError::DocumentFetch { .. }
            | B3MarginError::ExportWrite { .. } => 1,
            B3MarginError::ConfigParse { .. }
            | B3MarginError::ConfigMissing { .. }
            | B3MarginError::ConfigInvalid { .. } => 2,
            B3MarginError::MarketData { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
