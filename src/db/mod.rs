use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::models::Receipt;
use crate::services::history::History;
use crate::utils::sha256_hex;

pub mod memory;

pub use memory::MemoryStore;

/// Fixed key holding the serialized history.
pub const HISTORY_KEY: &str = "receipt_history";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Could not serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Receipt history was changed by another session; reload before saving")]
    Conflict,
}

/// History as read from a store, with the number of stored records that
/// could not be read. A blob that is not a JSON array counts as one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedHistory {
    pub history: History,
    pub skipped: usize,
}

impl LoadedHistory {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// Durable home of the receipt history.
///
/// Loading never fails: unreadable records are left out and counted.
/// Saving overwrites the whole blob and reports failures.
pub trait HistoryStore {
    fn load(&self) -> LoadedHistory;

    fn load_history(&self) -> History {
        self.load().history
    }

    fn save_history(&self, history: &History) -> Result<(), StoreError>;

    /// Fingerprint of the stored blob, `None` when nothing is stored yet.
    fn revision(&self) -> Result<Option<String>, StoreError>;

    /// Copies the stored blob, as is, under `backup_key(tag)`.
    fn backup_history(&self, tag: &str) -> Result<String, StoreError>;
}

pub fn backup_key(tag: &str) -> String {
    format!("{}.bak.{}", HISTORY_KEY, tag)
}

/// Decodes a stored blob record by record. Records that do not fit are
/// skipped, the rest load normally.
pub fn decode_history(raw: Option<&str>) -> LoadedHistory {
    let Some(raw) = raw else {
        return LoadedHistory::default();
    };
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "Stored receipt history is unreadable, starting empty");
            return LoadedHistory {
                history: History::new(),
                skipped: 1,
            };
        }
    };

    let mut receipts = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Receipt>(record) {
            Ok(receipt) => receipts.push(receipt),
            Err(err) => {
                warn!(index, error = %err, "Skipping unreadable stored receipt");
                skipped += 1;
            }
        }
    }
    LoadedHistory {
        history: History::from_receipts(receipts),
        skipped,
    }
}

pub fn encode_history(history: &History) -> Result<String, StoreError> {
    Ok(serde_json::to_string(history)?)
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> SqlResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![(
            "001_create_settings.sql",
            include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/migrations/001_create_settings.sql"
            )),
        )];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> SqlResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        stmt.query_row(params![key], |row| row.get(0)).optional()
    }
}

impl HistoryStore for Database {
    fn load(&self) -> LoadedHistory {
        match self.get_setting(HISTORY_KEY) {
            Ok(raw) => decode_history(raw.as_deref()),
            Err(err) => {
                warn!(error = %err, "Could not read receipt history, starting empty");
                LoadedHistory {
                    history: History::new(),
                    skipped: 1,
                }
            }
        }
    }

    fn save_history(&self, history: &History) -> Result<(), StoreError> {
        let blob = encode_history(history)?;
        self.set_setting(HISTORY_KEY, &blob)?;
        Ok(())
    }

    fn revision(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .get_setting(HISTORY_KEY)?
            .map(|raw| sha256_hex(raw.as_bytes())))
    }

    fn backup_history(&self, tag: &str) -> Result<String, StoreError> {
        let key = backup_key(tag);
        if let Some(raw) = self.get_setting(HISTORY_KEY)? {
            self.set_setting(&key, &raw)?;
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;

    fn receipt(id: &str, no: &str) -> Receipt {
        Receipt {
            id: id.to_string(),
            receipt_no: no.to_string(),
            received_from: "Customer".to_string(),
            bis_certificate_no: String::new(),
            date: "16/10/2026".to_string(),
            time: "10:00:00".to_string(),
            items: vec![LineItem::blank("row".to_string())],
            dc_no: "BY HAND".to_string(),
            dc_date: "16/10/2026".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn missing_history_is_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_history().is_empty());
        assert_eq!(db.revision().unwrap(), None);
    }

    #[test]
    fn corrupt_history_is_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(HISTORY_KEY, "{not json").unwrap();
        let loaded = db.load();
        assert!(loaded.history.is_empty());
        assert!(!loaded.is_clean());

        db.set_setting(HISTORY_KEY, r#"{"receipts": 3}"#).unwrap();
        assert!(db.load_history().is_empty());
        assert_eq!(db.load().skipped, 1);
    }

    #[test]
    fn bad_record_does_not_hide_good_ones() {
        let db = Database::open_in_memory().unwrap();
        let raw = r#"[{"id":"a","receiptNo":"RC1","items":[]},
            {"id":"b","receiptNo":3,"items":[]},
            {"receiptNo":"RC4","items":[]},
            {"id":"c","receiptNo":"RC2","items":[]}]"#;
        db.set_setting(HISTORY_KEY, raw).unwrap();

        let loaded = db.load();
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.history.next_receipt_number(), "RC3");
    }

    #[test]
    fn backup_copies_the_blob_verbatim() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(HISTORY_KEY, "][").unwrap();
        let key = db.backup_history("7").unwrap();
        assert_eq!(key, "receipt_history.bak.7");
        assert_eq!(db.get_setting(&key).unwrap().as_deref(), Some("]["));
    }

    #[test]
    fn saves_and_loads_history() {
        let db = Database::open_in_memory().unwrap();
        let mut history = History::new();
        history.upsert(&receipt("a", "RC1"), 10);
        history.upsert(&receipt("b", "RC2"), 20);
        db.save_history(&history).unwrap();

        assert_eq!(db.load_history(), history);
        assert!(db.revision().unwrap().is_some());
    }

    #[test]
    fn revision_follows_content() {
        let db = Database::open_in_memory().unwrap();
        let mut history = History::new();
        history.upsert(&receipt("a", "RC1"), 10);
        db.save_history(&history).unwrap();
        let first = db.revision().unwrap();

        history.upsert(&receipt("a", "RC1"), 11);
        db.save_history(&history).unwrap();
        assert_ne!(db.revision().unwrap(), first);
    }

    #[test]
    fn reads_records_written_by_the_browser_form() {
        let raw = r#"[{"id":"k2j3h4g","receiptNo":"RC2","receivedFrom":"M/s Gold","bisCertificateNo":"",
            "date":"01/10/2026","time":"11:02:03","dcNo":"BY HAND","dcDate":"01/10/2026",
            "items":[{"id":"q1","description":"RING","qty":"4","customerGrossWeight":"3.5",
            "customerNetWeight":3.4,"centreGrossWeight":0,"centreNetWeight":0,
            "declaredPurity":"22K916","remarks":""}],"createdAt":1759300000000}]"#;
        let loaded = decode_history(Some(raw));
        assert!(loaded.is_clean());
        let history = loaded.history;
        assert_eq!(history.len(), 1);
        let stored = history.find("RC2").unwrap();
        assert_eq!(stored.items[0].qty.count(), 4);
        assert_eq!(stored.items[0].customer_net_weight.value(), 3.4);
        assert_eq!(stored.created_at, 1_759_300_000_000);
    }
}
