use serde::{Deserialize, Serialize};

use crate::models::{Receipt, ReceiptSummary};
use crate::services::numbering::next_receipt_number;

/// Every saved receipt, at most one per receipt id.
///
/// Serializes as a bare JSON array. Storage order carries no meaning; the
/// listing order is computed on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    receipts: Vec<Receipt>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Builds a history from raw records, keeping the last record seen for
    /// any repeated id.
    pub fn from_receipts(receipts: Vec<Receipt>) -> Self {
        let mut history = History::new();
        for receipt in receipts {
            history.receipts.retain(|existing| existing.id != receipt.id);
            history.receipts.push(receipt);
        }
        history
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter()
    }

    /// Replaces any entry with the same id and appends `receipt` stamped
    /// with `saved_at`. Returns the stored copy.
    pub fn upsert(&mut self, receipt: &Receipt, saved_at: i64) -> &Receipt {
        self.receipts.retain(|existing| existing.id != receipt.id);
        let mut stored = receipt.clone();
        stored.created_at = saved_at;
        self.receipts.push(stored);
        &self.receipts[self.receipts.len() - 1]
    }

    /// Newest first. Equal timestamps keep their storage order.
    pub fn by_recency(&self) -> Vec<&Receipt> {
        let mut ordered: Vec<&Receipt> = self.receipts.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ordered
    }

    pub fn summaries(&self) -> Vec<ReceiptSummary> {
        self.by_recency().into_iter().map(ReceiptSummary::from).collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Receipt> {
        self.receipts.iter().find(|receipt| receipt.id == id)
    }

    /// Lookup by receipt number, falling back to id. Receipt numbers are not
    /// guaranteed unique; the most recently saved match wins.
    pub fn find(&self, key: &str) -> Option<&Receipt> {
        let key = key.trim();
        self.by_recency()
            .into_iter()
            .find(|receipt| receipt.receipt_no.eq_ignore_ascii_case(key))
            .or_else(|| self.find_by_id(key))
    }

    pub fn next_receipt_number(&self) -> String {
        next_receipt_number(&self.receipts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use pretty_assertions::assert_eq;

    fn receipt(id: &str, no: &str, from: &str) -> Receipt {
        Receipt {
            id: id.to_string(),
            receipt_no: no.to_string(),
            received_from: from.to_string(),
            bis_certificate_no: String::new(),
            date: "16/10/2026".to_string(),
            time: "09:00:00".to_string(),
            items: vec![LineItem::blank(format!("{}-item", id))],
            dc_no: "BY HAND".to_string(),
            dc_date: "16/10/2026".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn upsert_replaces_same_id() {
        let mut history = History::new();
        let mut working = receipt("a", "RC1", "First");
        history.upsert(&working, 100);
        working.received_from = "Second".to_string();
        history.upsert(&working, 200);

        assert_eq!(history.len(), 1);
        let stored = history.find_by_id("a").unwrap();
        assert_eq!(stored.received_from, "Second");
        assert_eq!(stored.created_at, 200);
    }

    #[test]
    fn lists_newest_first() {
        let mut history = History::new();
        history.upsert(&receipt("a", "RC1", "A"), 1);
        history.upsert(&receipt("c", "RC3", "C"), 3);
        history.upsert(&receipt("b", "RC2", "B"), 2);

        let order: Vec<&str> = history.by_recency().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn resaving_moves_receipt_to_the_top() {
        let mut history = History::new();
        history.upsert(&receipt("a", "RC1", "A"), 1);
        history.upsert(&receipt("b", "RC2", "B"), 2);
        history.upsert(&receipt("a", "RC1", "A again"), 3);

        let summaries = history.summaries();
        assert_eq!(summaries[0].id, "a");
        assert_eq!(summaries[0].received_from, "A again");
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn find_prefers_receipt_number_then_id() {
        let mut history = History::new();
        history.upsert(&receipt("x1", "RC5", "A"), 1);
        history.upsert(&receipt("x2", "RC6", "B"), 2);

        assert_eq!(history.find("rc6").map(|r| r.id.as_str()), Some("x2"));
        assert_eq!(history.find("x1").map(|r| r.id.as_str()), Some("x1"));
        assert!(history.find("RC9").is_none());
    }

    #[test]
    fn duplicate_ids_in_raw_records_collapse() {
        let history = History::from_receipts(vec![
            receipt("a", "RC1", "old"),
            receipt("a", "RC1", "new"),
        ]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.find_by_id("a").unwrap().received_from, "new");
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut history = History::new();
        history.upsert(&receipt("a", "RC1", "A"), 7);
        let value = serde_json::to_value(&history).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["receiptNo"], "RC1");
        assert_eq!(value[0]["createdAt"], 7);
    }
}
