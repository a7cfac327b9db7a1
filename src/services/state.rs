use chrono::Local;
use tracing::{info, warn};

use crate::db::{HistoryStore, LoadedHistory, StoreError};
use crate::models::{Receipt, ReceiptSummary, Settings};
use crate::services::editor::{EditError, ReceiptEditor};
use crate::services::history::History;
use crate::services::totals::{format_payable, Totals};
use crate::utils::now_millis;

/// One operator session: the store handle, the history snapshot read at
/// startup, the receipt being edited and the configuration it prints with.
pub struct AppState {
    store: Box<dyn HistoryStore>,
    history: History,
    editor: ReceiptEditor,
    settings: Settings,
    seen_revision: Option<String>,
    unreadable: usize,
}

impl AppState {
    pub fn new(store: Box<dyn HistoryStore>, settings: Settings) -> Self {
        let LoadedHistory { history, skipped } = store.load();
        let seen_revision = current_revision(store.as_ref());
        let editor = ReceiptEditor::blank(history.next_receipt_number(), Local::now());
        info!(
            saved = history.len(),
            unreadable = skipped,
            receipt = %editor.receipt().receipt_no,
            "Session started"
        );
        AppState {
            store,
            history,
            editor,
            settings,
            seen_revision,
            unreadable: skipped,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Stored records left out of `history` because they could not be read.
    pub fn unreadable_records(&self) -> usize {
        self.unreadable
    }

    pub fn receipt(&self) -> &Receipt {
        self.editor.receipt()
    }

    pub fn editor(&self) -> &ReceiptEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ReceiptEditor {
        &mut self.editor
    }

    pub fn totals(&self) -> Totals {
        self.editor.totals()
    }

    pub fn payable(&self) -> String {
        format_payable(
            self.totals().pieces,
            self.settings.rate_per_piece,
            self.settings.minimum_payable,
        )
    }

    pub fn save(&mut self) -> Result<ReceiptSummary, StoreError> {
        self.save_at(now_millis())
    }

    /// Upserts the working receipt stamped with `saved_at` and writes the
    /// whole history back. On failure nothing in memory changes.
    ///
    /// When the loaded blob had unreadable records it is first copied to
    /// `backup_key(saved_at)`; the save is refused if that copy fails.
    pub fn save_at(&mut self, saved_at: i64) -> Result<ReceiptSummary, StoreError> {
        let stored = self.store.revision()?;
        if stored != self.seen_revision {
            warn!(receipt = %self.receipt().receipt_no, "History changed since it was loaded");
            return Err(StoreError::Conflict);
        }
        if self.unreadable > 0 {
            let key = self.store.backup_history(&saved_at.to_string())?;
            warn!(
                unreadable = self.unreadable,
                backup = %key,
                "Kept the previous history before overwriting it"
            );
        }

        let mut next = self.history.clone();
        let summary = ReceiptSummary::from(next.upsert(self.editor.receipt(), saved_at));
        self.store.save_history(&next)?;

        if let Some(saved) = next.find_by_id(&summary.id) {
            self.editor.mark_saved(saved);
        }
        self.history = next;
        self.seen_revision = current_revision(self.store.as_ref());
        self.unreadable = 0;
        info!(receipt = %summary.receipt_no, total = self.history.len(), "Receipt saved");
        Ok(summary)
    }

    /// Drops the working receipt for a blank one numbered after the history.
    pub fn new_receipt(&mut self) -> &Receipt {
        self.editor = ReceiptEditor::blank(self.history.next_receipt_number(), Local::now());
        info!(receipt = %self.editor.receipt().receipt_no, "New receipt");
        self.editor.receipt()
    }

    /// Replaces the working receipt with a saved one, by receipt number or id.
    pub fn load(&mut self, key: &str) -> Result<&Receipt, EditError> {
        let receipt = self
            .history
            .find(key)
            .cloned()
            .ok_or_else(|| EditError::UnknownReceipt(key.to_string()))?;
        info!(receipt = %receipt.receipt_no, "Receipt loaded from history");
        self.editor = ReceiptEditor::open(receipt);
        Ok(self.editor.receipt())
    }

    /// Re-reads the history from the store. The working receipt is kept.
    pub fn reload(&mut self) -> usize {
        let LoadedHistory { history, skipped } = self.store.load();
        self.history = history;
        self.unreadable = skipped;
        self.seen_revision = current_revision(self.store.as_ref());
        info!(saved = self.history.len(), unreadable = skipped, "History reloaded");
        self.history.len()
    }
}

fn current_revision(store: &dyn HistoryStore) -> Option<String> {
    match store.revision() {
        Ok(revision) => revision,
        Err(err) => {
            warn!(error = %err, "Could not read history revision");
            None
        }
    }
}
