//! Flat CSV export of the margin snapshot.
//!
//! A portable secondary artifact mirroring the store: one `symbol,margin` row
//! per record, margin text left raw (decimal convention untouched).

use crate::domain::error::B3MarginError;
use crate::domain::extract::MarginRecord;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_PATH: &str = "margem.csv";

pub struct CsvExportAdapter {
    path: PathBuf,
}

impl CsvExportAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, records: &[MarginRecord]) -> Result<(), B3MarginError> {
        let map_err = |e: csv::Error| B3MarginError::ExportWrite {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let mut writer = csv::Writer::from_path(&self.path).map_err(map_err)?;
        writer.write_record(["symbol", "margin"]).map_err(map_err)?;
        for record in records {
            writer
                .write_record([record.symbol.as_str(), record.margin_text.as_str()])
                .map_err(map_err)?;
        }
        writer.flush().map_err(|e| B3MarginError::ExportWrite {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
