//! SQLite margin store adapter.

use crate::domain::error::B3MarginError;
use crate::domain::extract::MarginRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::MarginStorePort;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub const DEFAULT_DB_PATH: &str = "margem.db";

const META_UPDATED_AT: &str = "updated_at";

pub struct SqliteStoreAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStoreAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, B3MarginError> {
        let db_path = config.get_string_or("sqlite", "path", DEFAULT_DB_PATH);
        let pool_size = config.get_int("sqlite", "pool_size", 1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, B3MarginError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn initialize_schema(&self) -> Result<(), B3MarginError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS margins (
                symbol TEXT PRIMARY KEY,
                margin TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl MarginStorePort for SqliteStoreAdapter {
    fn replace_all(&self, records: &[MarginRecord]) -> Result<(), B3MarginError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        // Single transaction: readers on other connections see either the
        // previous snapshot or the new one, never an empty table.
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?;

        tx.execute("DELETE FROM margins", [])
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?;

        for record in records {
            // Duplicate symbols within one extraction resolve last-write-wins.
            tx.execute(
                "INSERT OR REPLACE INTO margins (symbol, margin) VALUES (?1, ?2)",
                params![record.symbol, record.margin_text],
            )
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![META_UPDATED_AT, Utc::now().to_rfc3339()],
        )
        .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
            reason: e.to_string(),
        })?;

        tx.commit()
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })
    }

    fn lookup(&self, symbol: &str) -> Result<Option<String>, B3MarginError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        conn.query_row(
            "SELECT margin FROM margins WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(B3MarginError::StoreQuery {
                reason: other.to_string(),
            }),
        })
    }

    fn all_records(&self) -> Result<Vec<MarginRecord>, B3MarginError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        let mut stmt = conn
            .prepare("SELECT symbol, margin FROM margins ORDER BY symbol")
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(MarginRecord {
                    symbol: row.get(0)?,
                    margin_text: row.get(1)?,
                })
            })
            .map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e: rusqlite::Error| B3MarginError::StoreQuery {
                reason: e.to_string(),
            })?);
        }

        Ok(records)
    }

    fn last_updated(&self) -> Result<Option<DateTime<Utc>>, B3MarginError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| B3MarginError::Store {
                reason: e.to_string(),
            })?;

        let stamp: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![META_UPDATED_AT],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(B3MarginError::StoreQuery {
                    reason: other.to_string(),
                }),
            })?;

        match stamp {
            Some(text) => {
                let parsed = DateTime::parse_from_rfc3339(&text).map_err(|e| {
                    B3MarginError::StoreQuery {
                        reason: format!("bad {META_UPDATED_AT} stamp '{text}': {e}"),
                    }
                })?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, margin_text: &str) -> MarginRecord {
        MarginRecord {
            symbol: symbol.into(),
            margin_text: margin_text.into(),
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        store
            .replace_all(&[record("PETR4", "0,10"), record("PETRB120", "1.500,00")])
            .unwrap();

        assert_eq!(store.lookup("PETR4").unwrap(), Some("0,10".to_string()));
        assert_eq!(
            store.lookup("PETRB120").unwrap(),
            Some("1.500,00".to_string())
        );
        assert_eq!(store.lookup("VALE3").unwrap(), None);
    }

    #[test]
    fn replace_all_discards_previous_snapshot() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        store.replace_all(&[record("PETR4", "0,10")]).unwrap();
        store.replace_all(&[record("VALE3", "45,00")]).unwrap();

        assert_eq!(store.lookup("PETR4").unwrap(), None);
        assert_eq!(store.lookup("VALE3").unwrap(), Some("45,00".to_string()));
    }

    #[test]
    fn duplicate_symbols_resolve_last_write_wins() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        store
            .replace_all(&[record("PETR4", "0,10"), record("PETR4", "0,20")])
            .unwrap();

        assert_eq!(store.lookup("PETR4").unwrap(), Some("0,20".to_string()));
    }

    #[test]
    fn all_records_ordered_by_symbol() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        store
            .replace_all(&[record("VALE3", "45,00"), record("PETR4", "0,10")])
            .unwrap();

        let all = store.all_records().unwrap();
        assert_eq!(all, vec![record("PETR4", "0,10"), record("VALE3", "45,00")]);
    }

    #[test]
    fn last_updated_tracks_writes() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        assert_eq!(store.last_updated().unwrap(), None);

        let before = Utc::now();
        store.replace_all(&[record("PETR4", "0,10")]).unwrap();
        let stamp = store.last_updated().unwrap().unwrap();
        assert!(stamp >= before - chrono::Duration::seconds(1));
        assert!(stamp <= Utc::now() + chrono::Duration::seconds(1));
    }

    #[test]
    fn empty_replace_clears_store() {
        let store = SqliteStoreAdapter::in_memory().unwrap();
        store.replace_all(&[record("PETR4", "0,10")]).unwrap();
        store.replace_all(&[]).unwrap();
        assert_eq!(store.lookup("PETR4").unwrap(), None);
        assert!(store.all_records().unwrap().is_empty());
    }

    #[test]
    fn from_config_opens_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::adapters::file_config_adapter::FileConfigAdapter::from_string(
            &format!("[sqlite]\npath = {}\n", dir.path().join("m.db").display()),
        )
        .unwrap();
        let store = SqliteStoreAdapter::from_config(&config).unwrap();
        store.replace_all(&[record("PETR4", "0,10")]).unwrap();
        assert_eq!(store.lookup("PETR4").unwrap(), Some("0,10".to_string()));
    }
}
