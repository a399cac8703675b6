//! Margin store access port trait.

use crate::domain::error::B3MarginError;
use crate::domain::extract::MarginRecord;
use chrono::{DateTime, Utc};

/// Durable symbol -> margin-text mapping, replaced wholesale on every
/// successful extraction run.
pub trait MarginStorePort {
    /// Atomically clear the store and insert the given record set. Either
    /// every record lands or none do; readers never observe an empty store
    /// mid-write.
    fn replace_all(&self, records: &[MarginRecord]) -> Result<(), B3MarginError>;

    /// Raw margin text for an exact (uppercase) symbol match.
    fn lookup(&self, symbol: &str) -> Result<Option<String>, B3MarginError>;

    /// The full current snapshot, ordered by symbol.
    fn all_records(&self) -> Result<Vec<MarginRecord>, B3MarginError>;

    /// When the current snapshot was written, if the store has ever been
    /// populated.
    fn last_updated(&self) -> Result<Option<DateTime<Utc>>, B3MarginError>;
}
