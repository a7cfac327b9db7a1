use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{backup_key, decode_history, encode_history, HistoryStore, LoadedHistory, StoreError};
use crate::services::history::History;
use crate::utils::sha256_hex;

/// In-process store. Clones share the same blob, which is how two sessions
/// over one store are modelled.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Rc<RefCell<Option<String>>>,
    backups: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Starts from an arbitrary stored value, readable or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemoryStore {
            blob: Rc::new(RefCell::new(Some(raw.into()))),
            ..MemoryStore::default()
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    pub fn backup(&self, key: &str) -> Option<String> {
        self.backups.borrow().get(key).cloned()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> LoadedHistory {
        decode_history(self.blob.borrow().as_deref())
    }

    fn save_history(&self, history: &History) -> Result<(), StoreError> {
        let encoded = encode_history(history)?;
        *self.blob.borrow_mut() = Some(encoded);
        Ok(())
    }

    fn revision(&self) -> Result<Option<String>, StoreError> {
        Ok(self.blob.borrow().as_deref().map(|raw| sha256_hex(raw.as_bytes())))
    }

    fn backup_history(&self, tag: &str) -> Result<String, StoreError> {
        let key = backup_key(tag);
        if let Some(raw) = self.blob.borrow().clone() {
            self.backups.borrow_mut().insert(key.clone(), raw);
        }
        Ok(key)
    }
}
